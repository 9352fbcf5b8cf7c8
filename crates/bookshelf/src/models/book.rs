use serde::{Deserialize, Serialize};

use bookshelf_core::book::{BookField, BookFilters, BookPatch, NewBook};
use bookshelf_core::storage::{Pagination, PaginationError, DEFAULT_PAGE_SIZE};

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request payload for creating or replacing a book.
#[derive(Debug, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub image_path: String,
}

impl BookPayload {
    /// Converts the create request into a NewBook.
    pub fn into_new_book(self) -> NewBook {
        NewBook::new(self.title, self.author).with_image_path(self.image_path)
    }

    /// Converts the update request into a patch. An empty image path keeps
    /// the stored one.
    pub fn into_patch(self) -> BookPatch {
        BookPatch::new(self.title, self.author).with_image_path(self.image_path)
    }
}

/// Query parameters for listing books.
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// Page number, starting at 1 (default: 1)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Books per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub image_path: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl ListBooksQuery {
    /// Validated page request, capped at [`MAX_PAGE_SIZE`].
    pub fn pagination(&self) -> Result<Pagination, PaginationError> {
        if self.page_size > MAX_PAGE_SIZE {
            return Err(PaginationError::PageSizeTooLarge { max: MAX_PAGE_SIZE });
        }
        Pagination::new(self.page, self.page_size)
    }

    /// Exact-match filters. Blank parameters (`?title=`) are ignored.
    pub fn filters(&self) -> BookFilters {
        [
            (BookField::Title, &self.title),
            (BookField::Author, &self.author),
            (BookField::ImagePath, &self.image_path),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (field, v.to_string()))
        })
        .collect()
    }
}

/// Body returned after a cover image upload.
#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub message: String,
    pub image_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(title: Option<&str>, author: Option<&str>) -> ListBooksQuery {
        ListBooksQuery {
            page: 1,
            page_size: 10,
            title: title.map(str::to_string),
            author: author.map(str::to_string),
            image_path: None,
        }
    }

    #[test]
    fn test_filters_skip_blank_values() {
        let filters = query(Some(""), Some("Clarice Lispector")).filters();

        assert_eq!(filters.len(), 1);
        assert_eq!(filters.get(BookField::Author), Some("Clarice Lispector"));
    }

    #[test]
    fn test_no_parameters_means_no_filters() {
        assert!(query(None, None).filters().is_empty());
    }

    #[test]
    fn test_defaults_from_empty_query_string() {
        let query: ListBooksQuery = serde_json::from_str("{}").unwrap();

        let page = query.pagination().unwrap();
        assert_eq!(page.page(), 1);
        assert_eq!(page.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_oversized_page_rejected() {
        let mut query = query(None, None);
        query.page_size = 1_000;

        assert_eq!(
            query.pagination(),
            Err(PaginationError::PageSizeTooLarge { max: MAX_PAGE_SIZE })
        );
    }

    #[test]
    fn test_page_size_limits() {
        let mut query = query(None, None);

        query.page_size = MAX_PAGE_SIZE;
        assert_eq!(query.pagination().unwrap().page_size(), MAX_PAGE_SIZE);

        query.page_size = 0;
        assert_eq!(query.pagination(), Err(PaginationError::InvalidPageSize));
    }

    #[test]
    fn test_update_payload_without_image_keeps_image() {
        let payload: BookPayload =
            serde_json::from_str(r#"{"title":"A Hora da Estrela","author":"Clarice"}"#).unwrap();

        assert_eq!(payload.into_patch().image_path, "");
    }
}
