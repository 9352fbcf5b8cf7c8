use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use bookshelf_core::auth::{AuthError, TokenClaims, UserId};

use super::TokenIssuer;
use crate::handlers::AppError;

/// Extractor for the caller of a protected route. Rejects with 401 when the
/// bearer token is missing, malformed, forged or expired.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
}

impl AuthUser {
    fn from_claims(claims: TokenClaims) -> Result<Self, AuthError> {
        let id = claims
            .user_id()
            .ok_or_else(|| AuthError::InvalidToken("subject is not a user id".to_string()))?;
        Ok(Self {
            id,
            username: claims.username,
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenIssuer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let issuer = Arc::<TokenIssuer>::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken("malformed authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = issuer.verify(token).inspect_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
        })?;

        Ok(Self::from_claims(claims)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> TokenClaims {
        TokenClaims {
            sub: sub.to_string(),
            username: "clarice".to_string(),
            iat: 0,
            exp: 60,
            jti: "jti".to_string(),
        }
    }

    #[test]
    fn test_caller_carries_id_and_username() {
        let user = AuthUser::from_claims(claims("42")).unwrap();

        assert_eq!(user.id, 42);
        assert_eq!(user.username, "clarice");
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        assert!(matches!(
            AuthUser::from_claims(claims("clarice")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
