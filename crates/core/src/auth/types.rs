use serde::{Deserialize, Serialize};

/// Store-assigned identity of a user.
pub type UserId = u64;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// PHC-formatted password hash. Never sent to clients.
    pub password_hash: String,
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Username and password as submitted on register and login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Claims carried by an access token. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id, as a string.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

impl TokenClaims {
    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_subject_parses_as_user_id() {
        let claims = TokenClaims {
            sub: "42".to_string(),
            username: "clarice".to_string(),
            iat: 0,
            exp: 60,
            jti: "abc".to_string(),
        };
        assert_eq!(claims.user_id(), Some(42));
    }

    #[test]
    fn claims_with_garbage_subject_have_no_user_id() {
        let claims = TokenClaims {
            sub: "not-a-number".to_string(),
            username: "clarice".to_string(),
            iat: 0,
            exp: 60,
            jti: "abc".to_string(),
        };
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn credentials_default_missing_fields_to_empty() {
        let credentials: Credentials = serde_json::from_str(r#"{"username":"clarice"}"#).unwrap();
        assert_eq!(credentials.username, "clarice");
        assert_eq!(credentials.password, "");
    }
}
