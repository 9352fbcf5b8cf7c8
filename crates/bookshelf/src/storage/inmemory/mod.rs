//! In-memory storage backend.
//!
//! Keeps books and users in ordered maps behind `Arc<RwLock<_>>`. Nothing
//! is persisted; intended for tests and local development.

mod repository;

pub use repository::InMemoryRepository;
