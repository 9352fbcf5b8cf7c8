use super::error::BookError;
use super::types::{BookPatch, NewBook};

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum author length, in characters.
pub const MAX_AUTHOR_LEN: usize = 200;

fn validate_title_and_author(title: &str, author: &str) -> Result<(), BookError> {
    if title.trim().is_empty() {
        return Err(BookError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(BookError::TitleTooLong);
    }
    if author.trim().is_empty() {
        return Err(BookError::EmptyAuthor);
    }
    if author.chars().count() > MAX_AUTHOR_LEN {
        return Err(BookError::AuthorTooLong);
    }
    Ok(())
}

/// Validates a book before creation.
pub fn validate_new_book(book: &NewBook) -> Result<(), BookError> {
    validate_title_and_author(&book.title, &book.author)
}

/// Validates a patch before it is applied.
///
/// Title and author are always written, so they follow the same rules as
/// on creation.
pub fn validate_patch(patch: &BookPatch) -> Result<(), BookError> {
    validate_title_and_author(&patch.title, &patch.author)
}

/// Validates the target of a dedicated image update. Unlike a patch, an
/// empty path here would clear the image, which is not allowed.
pub fn validate_image_path(image_path: &str) -> Result<(), BookError> {
    if image_path.trim().is_empty() {
        return Err(BookError::EmptyImagePath);
    }
    Ok(())
}
