use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username: {0}")]
    InvalidUsername(&'static str),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("username and password are required")]
    MissingCredentials,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("username already taken")]
    UsernameTaken,
}

/// Maps an [`AuthError`] to an HTTP status code.
pub fn auth_error_to_status_code(error: &AuthError) -> u16 {
    match error {
        AuthError::InvalidUsername(_)
        | AuthError::PasswordTooShort { .. }
        | AuthError::MissingCredentials => 400,
        AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken(_) => {
            401
        }
        AuthError::UsernameTaken => 409,
    }
}
