use bookshelf_core::auth::{calculate_expiry, is_token_expired, AuthError, TokenClaims, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

/// Issues and verifies HS256 access tokens.
///
/// Keys are derived once from the shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Signs a fresh token for `user`.
    ///
    /// Signing failures keep the library error and map to 500 at the edge.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let issued_at = Utc::now();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: issued_at.timestamp(),
            exp: calculate_expiry(issued_at, self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        // Expiry is checked below against the same clock that issues tokens,
        // without the library's default leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("signature is invalid".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if is_token_expired(&data.claims, Utc::now()) {
            return Err(AuthError::InvalidToken("token has expired".to_string()));
        }

        Ok(data.claims)
    }
}
