//! Cache key derivation.
//!
//! Every key carries a schema version in its prefix. Bumping the version
//! orphans entries written in an older layout; they age out on their TTL.

use crate::book::{BookFilters, BookId};
use crate::storage::Pagination;

/// Prefix shared by every key this crate produces.
pub const KEY_PREFIX: &str = "bookshelf:v1:";

/// Key for a single book.
pub fn book_key(id: BookId) -> String {
    format!("{KEY_PREFIX}book:{id}")
}

/// Key for one page of a filtered book listing.
///
/// Filters are written in field-name order with percent-encoded values, so
/// the key only depends on the filter set itself and two different sets can
/// never collide.
pub fn books_list_key(filters: &BookFilters, page: Pagination) -> String {
    let mut key = format!("{KEY_PREFIX}books:list:");
    for (field, value) in filters.iter() {
        key.push_str(field.as_str());
        key.push('=');
        key.push_str(&urlencoding::encode(value));
        key.push(':');
    }
    key.push_str(&format!("page={}:size={}", page.page(), page.page_size()));
    key
}

/// Pattern matching every book listing key.
pub fn books_list_pattern() -> String {
    format!("{KEY_PREFIX}books:list:*")
}

/// Key of the set that tracks live listing keys, for backends without
/// native pattern deletion.
pub fn books_list_tracking_key() -> String {
    format!("{KEY_PREFIX}books:_keys")
}

/// Key holding the invalidation generation of a single book.
///
/// Writers replace it before dropping the book's entry; a reader that sees
/// it change while populating drops what it wrote.
pub fn book_generation_key(id: BookId) -> String {
    format!("{KEY_PREFIX}gen:book:{id}")
}

/// Key holding the invalidation generation of the listing namespace.
pub fn books_list_generation_key() -> String {
    format!("{KEY_PREFIX}gen:books:list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookField;
    use crate::cache::pattern_matches;

    fn page(page: u64, size: u64) -> Pagination {
        Pagination::new(page, size).unwrap()
    }

    #[test]
    fn test_book_key() {
        assert_eq!(book_key(42), "bookshelf:v1:book:42");
    }

    #[test]
    fn test_unfiltered_list_key() {
        assert_eq!(
            books_list_key(&BookFilters::new(), page(1, 10)),
            "bookshelf:v1:books:list:page=1:size=10"
        );
    }

    #[test]
    fn test_filtered_list_key_is_sorted() {
        let filters = BookFilters::new()
            .with(BookField::Title, "Quincas Borba")
            .with(BookField::Author, "Machado");

        assert_eq!(
            books_list_key(&filters, page(2, 5)),
            "bookshelf:v1:books:list:author=Machado:title=Quincas%20Borba:page=2:size=5"
        );
    }

    #[test]
    fn test_list_key_is_stable_across_insertion_order() {
        let a = BookFilters::new()
            .with(BookField::Title, "X")
            .with(BookField::Author, "Y");
        let b = BookFilters::new()
            .with(BookField::Author, "Y")
            .with(BookField::Title, "X");

        assert_eq!(books_list_key(&a, page(1, 10)), books_list_key(&b, page(1, 10)));
    }

    #[test]
    fn test_separators_inside_values_do_not_collide() {
        // Unescaped, both would render as "author=a:title=b:"
        let a = BookFilters::new()
            .with(BookField::Author, "a")
            .with(BookField::Title, "b");
        let b = BookFilters::new().with(BookField::Author, "a:title=b");

        assert_ne!(books_list_key(&a, page(1, 10)), books_list_key(&b, page(1, 10)));
    }

    #[test]
    fn test_pages_have_distinct_keys() {
        let filters = BookFilters::new();
        assert_ne!(
            books_list_key(&filters, page(1, 10)),
            books_list_key(&filters, page(2, 10))
        );
        assert_ne!(
            books_list_key(&filters, page(1, 10)),
            books_list_key(&filters, page(1, 20))
        );
    }

    #[test]
    fn test_list_pattern_matches_list_keys_only() {
        let pattern = books_list_pattern();
        let filters = BookFilters::new().with(BookField::Author, "Y");

        assert!(pattern_matches(&pattern, &books_list_key(&filters, page(3, 7))));
        assert!(!pattern_matches(&pattern, &book_key(1)));
        assert!(!pattern_matches(&pattern, &books_list_tracking_key()));
    }

    #[test]
    fn test_generation_keys_survive_list_invalidation() {
        let pattern = books_list_pattern();

        assert_eq!(book_generation_key(7), "bookshelf:v1:gen:book:7");
        assert!(!pattern_matches(&pattern, &book_generation_key(7)));
        assert!(!pattern_matches(&pattern, &books_list_generation_key()));
        assert_ne!(book_generation_key(7), book_key(7));
    }
}
