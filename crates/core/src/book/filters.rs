use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::Book;

/// A book attribute that list queries can filter on.
///
/// Variants are declared in name order so the derived `Ord` sorts them by
/// their string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookField {
    Author,
    ImagePath,
    Title,
}

impl BookField {
    /// Name used in query strings, cache keys and store columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookField::Author => "author",
            BookField::ImagePath => "image_path",
            BookField::Title => "title",
        }
    }

    /// Reads this attribute from a book.
    pub fn value_of<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            BookField::Author => &book.author,
            BookField::ImagePath => &book.image_path,
            BookField::Title => &book.title,
        }
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact-match filters for book list queries.
///
/// Keys are kept sorted, so two filter sets built in a different insertion
/// order iterate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilters(BTreeMap<BookField, String>);

impl BookFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the filter on `field`.
    pub fn with(mut self, field: BookField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: BookField, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: BookField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the filters in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (BookField, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Returns true when every filter matches the book exactly.
    pub fn matches(&self, book: &Book) -> bool {
        self.iter().all(|(field, value)| field.value_of(book) == value)
    }
}

impl FromIterator<(BookField, String)> for BookFilters {
    fn from_iter<I: IntoIterator<Item = (BookField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_iterate_in_name_order() {
        let filters = BookFilters::new()
            .with(BookField::Title, "X")
            .with(BookField::Author, "Y");

        let fields: Vec<_> = filters.iter().map(|(field, _)| field.as_str()).collect();

        assert_eq!(fields, vec!["author", "title"]);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = BookFilters::new()
            .with(BookField::Title, "X")
            .with(BookField::Author, "Y");
        let b = BookFilters::new()
            .with(BookField::Author, "Y")
            .with(BookField::Title, "X");

        assert_eq!(a, b);
    }

    #[test]
    fn test_matches_requires_every_filter() {
        let book = Book::new(1, "Vidas Secas", "Graciliano Ramos");

        assert!(BookFilters::new().matches(&book));
        assert!(BookFilters::new()
            .with(BookField::Author, "Graciliano Ramos")
            .matches(&book));
        assert!(!BookFilters::new()
            .with(BookField::Author, "Graciliano Ramos")
            .with(BookField::Title, "São Bernardo")
            .matches(&book));
    }

    #[test]
    fn test_matches_is_exact() {
        let book = Book::new(1, "Vidas Secas", "Graciliano Ramos");

        assert!(!BookFilters::new()
            .with(BookField::Author, "graciliano ramos")
            .matches(&book));
    }
}
