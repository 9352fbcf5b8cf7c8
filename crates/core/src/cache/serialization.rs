//! JSON encoding of books for cache storage.

use thiserror::Error;

use crate::book::Book;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

pub fn serialize_book(book: &Book) -> Result<Vec<u8>> {
    serde_json::to_vec(book).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

pub fn deserialize_book(bytes: &[u8]) -> Result<Book> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a page of books. An empty page is a valid value.
pub fn serialize_books(books: &[Book]) -> Result<Vec<u8>> {
    serde_json::to_vec(books).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

pub fn deserialize_books(bytes: &[u8]) -> Result<Vec<Book>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_survives_cache_encoding() {
        let book = Book::new(5, "A Hora da Estrela", "Clarice Lispector")
            .with_image_path("uploads/5.png");

        let bytes = serialize_book(&book).unwrap();

        assert_eq!(deserialize_book(&bytes).unwrap(), book);
    }

    #[test]
    fn test_field_order_is_irrelevant() {
        let bytes = br#"{"author":"Lima Barreto","image_path":"","title":"Policarpo","id":2}"#;

        assert_eq!(
            deserialize_book(bytes).unwrap(),
            Book::new(2, "Policarpo", "Lima Barreto")
        );
    }

    #[test]
    fn test_empty_page_is_cacheable() {
        let bytes = serialize_books(&[]).unwrap();

        assert_eq!(bytes, b"[]");
        assert!(deserialize_books(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_book_malformed_bytes() {
        let result = deserialize_book(b"not json");
        assert!(matches!(result, Err(SerializationError::DeserializeFailed(_))));
    }

    #[test]
    fn test_list_bytes_are_not_a_book() {
        let bytes = serialize_books(&[Book::new(1, "T", "A")]).unwrap();
        assert!(deserialize_book(&bytes).is_err());
    }
}
