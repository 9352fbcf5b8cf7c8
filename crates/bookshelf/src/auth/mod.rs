//! Password hashing, bearer tokens and the request guard for book routes.

mod extractor;
mod password;
mod token;

pub use extractor::AuthUser;
pub use password::{hash_password, verify_password};
pub use token::TokenIssuer;
