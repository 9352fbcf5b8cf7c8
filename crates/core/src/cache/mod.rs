mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    book_generation_key, book_key, books_list_generation_key, books_list_key, books_list_pattern,
    books_list_tracking_key, KEY_PREFIX,
};
pub use patterns::pattern_matches;
pub use serialization::{
    deserialize_book, deserialize_books, serialize_book, serialize_books, SerializationError,
};
pub use traits::Cache;
