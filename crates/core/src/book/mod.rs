mod error;
mod filters;
mod operations;
mod types;

pub use error::BookError;
pub use filters::{BookField, BookFilters};
pub use operations::{
    validate_image_path, validate_new_book, validate_patch, MAX_AUTHOR_LEN, MAX_TITLE_LEN,
};
pub use types::{Book, BookId, BookPatch, NewBook};
