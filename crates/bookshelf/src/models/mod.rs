mod auth;
mod book;

pub use auth::{MessageResponse, TokenResponse};
pub use book::{BookPayload, ImageUploadResponse, ListBooksQuery};
