use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_core::auth::{auth_error_to_status_code, AuthError};
use bookshelf_core::storage::{repository_error_to_status_code, PaginationError, RepositoryError};

pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(repo_error)
        } else if let Some(auth_error) = self.0.downcast_ref::<AuthError>() {
            auth_error_to_status_code(auth_error)
        } else if self.0.downcast_ref::<PaginationError>().is_some() {
            400
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let message = format!("{:#}", self.0);

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %message, "Request failed");
        } else {
            tracing::warn!(status = %status_code, error = %message, "Request rejected");
        }

        (
            status_code,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn status_of(err: impl Into<anyhow::Error>) -> StatusCode {
        AppError::from(err).status_code()
    }

    #[test]
    fn test_repository_errors_keep_their_status() {
        assert_eq!(
            status_of(RepositoryError::book_not_found(7)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RepositoryError::ConnectionFailed("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_status_survives_context() {
        let err = Err::<(), _>(RepositoryError::InvalidData("bad".into()))
            .context("failed to create book")
            .unwrap_err();

        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_and_pagination_errors() {
        assert_eq!(status_of(AuthError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::UsernameTaken), StatusCode::CONFLICT);
        assert_eq!(status_of(PaginationError::InvalidPage), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_token_signing_failure_is_internal() {
        let err = Err::<(), _>(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidKeyFormat,
        ))
        .context("failed to sign token")
        .unwrap_err();

        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unknown_errors_are_internal() {
        assert_eq!(
            status_of(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
