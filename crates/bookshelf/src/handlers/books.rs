//! Book CRUD handlers.
//!
//! Every route requires a bearer token. Reads and writes go through the
//! cached repository held in [`AppState`].

use std::path::{Path as FsPath, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bookshelf_core::book::{Book, BookId};
use bookshelf_core::storage::RepositoryError;

use crate::{
    auth::AuthUser,
    handlers::AppError,
    models::{BookPayload, ImageUploadResponse, ListBooksQuery},
    state::AppState,
};

/// Public URL prefix under which uploaded images are served.
pub const UPLOADS_ROUTE: &str = "uploads";

/// List books (GET /books).
pub async fn list_books(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<Book>>, AppError> {
    let page = query.pagination()?;
    let filters = query.filters();

    let books = state
        .books
        .list_books(&filters, page)
        .await
        .context("failed to list books")?;

    tracing::debug!(
        user_id = user.id,
        username = %user.username,
        page = page.page(),
        page_size = page.page_size(),
        filters = filters.len(),
        count = books.len(),
        "Listed books"
    );

    Ok(Json(books))
}

/// Get a single book by ID (GET /books/{id}).
pub async fn get_book(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<Book>, AppError> {
    let book = state
        .books
        .get_book(id)
        .await
        .with_context(|| format!("failed to get book {id}"))?
        .ok_or_else(|| RepositoryError::book_not_found(id))?;

    Ok(Json(book))
}

/// Create a new book (POST /books).
pub async fn create_book(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, AppError> {
    let book = state
        .books
        .create_book(&payload.into_new_book())
        .await
        .context("failed to create book")?;

    tracing::info!(
        book_id = book.id,
        user_id = user.id,
        username = %user.username,
        title = %book.title,
        "Created new book"
    );

    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book by ID (PUT /books/{id}).
pub async fn update_book(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(payload): Json<BookPayload>,
) -> Result<Json<Book>, AppError> {
    let book = state
        .books
        .update_book(id, &payload.into_patch())
        .await
        .with_context(|| format!("failed to update book {id}"))?
        .ok_or_else(|| RepositoryError::book_not_found(id))?;

    tracing::info!(book_id = id, user_id = user.id, username = %user.username, "Updated book");

    Ok(Json(book))
}

/// Delete a book by ID (DELETE /books/{id}).
///
/// Deleting an unknown id also succeeds.
pub async fn delete_book(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    state
        .books
        .delete_book(id)
        .await
        .with_context(|| format!("failed to delete book {id}"))?;

    tracing::info!(book_id = id, user_id = user.id, username = %user.username, "Deleted book");

    Ok(StatusCode::NO_CONTENT)
}

/// Upload a cover image (POST /books/{id}/image).
///
/// Expects a multipart body with an `image` file field. The file is saved
/// as `{id}{ext}` in the upload directory and the book's image path is set
/// to its public location. A previous upload under another name is removed
/// once the new path is stored; the new file is removed if storing fails.
pub async fn upload_book_image(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    mut multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    // Fail before touching the disk when the book does not exist.
    let previous = state
        .books
        .get_book(id)
        .await
        .with_context(|| format!("failed to get book {id}"))?
        .ok_or_else(|| RepositoryError::book_not_found(id))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RepositoryError::InvalidData(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let extension = image_extension(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| RepositoryError::InvalidData(format!("failed to read image: {e}")))?;
        upload = Some((extension, bytes));
        break;
    }

    let (extension, bytes) = upload.ok_or_else(|| {
        RepositoryError::InvalidData("missing multipart field 'image'".to_string())
    })?;

    let filename = format!("{id}{extension}");
    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", state.upload_dir.display()))?;
    let saved = state.upload_dir.join(&filename);
    tokio::fs::write(&saved, &bytes)
        .await
        .with_context(|| format!("failed to save image for book {id}"))?;

    let image_path = format!("{UPLOADS_ROUTE}/{filename}");
    let replaced = previous.image_path != image_path;

    let updated = state
        .books
        .update_book_image(id, &image_path)
        .await
        .with_context(|| format!("failed to update image of book {id}"));
    match updated {
        Ok(Some(_)) => {}
        Ok(None) => {
            if replaced {
                remove_upload(&saved).await;
            }
            return Err(RepositoryError::book_not_found(id).into());
        }
        Err(err) => {
            if replaced {
                remove_upload(&saved).await;
            }
            return Err(err.into());
        }
    }

    if replaced {
        if let Some(old_file) = stored_upload_file(&state.upload_dir, &previous.image_path) {
            remove_upload(&old_file).await;
        }
    }

    tracing::info!(
        book_id = id,
        user_id = user.id,
        username = %user.username,
        size = bytes.len(),
        %image_path,
        "Uploaded book image"
    );

    Ok(Json(ImageUploadResponse {
        message: "Image uploaded successfully".to_string(),
        image_path,
    }))
}

/// Extension of the uploaded file, with its dot, or empty when the client
/// sent none. Anything but ASCII letters and digits is dropped.
fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| FsPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// File in `upload_dir` behind a stored image path, or `None` when the
/// path does not name a single file under the uploads route.
fn stored_upload_file(upload_dir: &FsPath, image_path: &str) -> Option<PathBuf> {
    let name = image_path
        .strip_prefix(UPLOADS_ROUTE)?
        .strip_prefix('/')?;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    Some(upload_dir.join(name))
}

/// Deletes an uploaded file. A file that is already gone is not an error.
async fn remove_upload(path: &FsPath) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed uploaded image"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Failed to remove uploaded image")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_upload_file() {
        let dir = FsPath::new("/srv/uploads");

        assert_eq!(
            stored_upload_file(dir, "uploads/7.png"),
            Some(dir.join("7.png"))
        );
        assert_eq!(stored_upload_file(dir, ""), None);
        assert_eq!(stored_upload_file(dir, "https://covers.example/7.png"), None);
        assert_eq!(stored_upload_file(dir, "uploads/"), None);
        assert_eq!(stored_upload_file(dir, "uploads/../secret"), None);
        assert_eq!(stored_upload_file(dir, "uploads/.."), None);
        assert_eq!(stored_upload_file(dir, "uploadsx/7.png"), None);
    }

    #[tokio::test]
    async fn test_remove_missing_upload_is_quiet() {
        let path = std::env::temp_dir().join(format!("bookshelf-{}.png", uuid::Uuid::new_v4()));

        remove_upload(&path).await;
        std::fs::write(&path, b"x").unwrap();
        remove_upload(&path).await;

        assert!(!path.exists());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(Some("cover.PNG")), ".png");
        assert_eq!(image_extension(Some("archive.tar.gz")), ".gz");
        assert_eq!(image_extension(Some("no-extension")), "");
        assert_eq!(image_extension(None), "");
    }

    #[test]
    fn test_image_extension_drops_path_characters() {
        assert_eq!(image_extension(Some("x.p/../ng")), "");
        assert_eq!(image_extension(Some("x.j pg")), ".jpg");
    }
}
