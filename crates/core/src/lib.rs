//! Functional core for bookshelf.
//!
//! Pure domain types, validation, cache key derivation and the traits the
//! storage and cache backends implement. Nothing in this crate performs I/O.

pub mod auth;
pub mod book;
pub mod cache;
pub mod storage;
