use serde::{Deserialize, Serialize};

/// Store-assigned identity of a book. Never changes once assigned.
pub type BookId = u64;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Relative path of the cover image. Empty when no image was uploaded.
    #[serde(default)]
    pub image_path: String,
}

impl Book {
    /// Creates a book without a cover image.
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            image_path: String::new(),
        }
    }

    /// Sets the cover image path.
    pub fn with_image_path(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = image_path.into();
        self
    }
}

/// A book that has not been persisted yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub image_path: String,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            image_path: String::new(),
        }
    }

    pub fn with_image_path(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = image_path.into();
        self
    }

    /// Attaches the identity assigned by the store.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            image_path: self.image_path,
        }
    }
}

/// Changes applied to an existing book.
///
/// Title and author always replace the stored values. The image path only
/// replaces the stored one when it is non-empty; an empty value means
/// "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub image_path: String,
}

impl BookPatch {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            image_path: String::new(),
        }
    }

    pub fn with_image_path(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = image_path.into();
        self
    }

    /// Applies this patch to `book` in place.
    pub fn apply_to(&self, book: &mut Book) {
        book.title.clone_from(&self.title);
        book.author.clone_from(&self.author);
        if !self.image_path.is_empty() {
            book.image_path.clone_from(&self.image_path);
        }
    }
}
