mod error;
mod functions;
mod types;
mod validation;

pub use error::{auth_error_to_status_code, AuthError};
pub use functions::{calculate_expiry, is_token_expired};
pub use types::{Credentials, NewUser, TokenClaims, User, UserId};
pub use validation::{
    validate_credentials, validate_password, validate_username, MAX_USERNAME_LEN,
    MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};
