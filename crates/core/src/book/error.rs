use thiserror::Error;

/// Errors that can occur when validating books or book queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Book title cannot be empty")]
    EmptyTitle,
    #[error("Book title too long (max 200 characters)")]
    TitleTooLong,
    #[error("Book author cannot be empty")]
    EmptyAuthor,
    #[error("Book author too long (max 200 characters)")]
    AuthorTooLong,
    #[error("Book image path cannot be empty")]
    EmptyImagePath,
}
