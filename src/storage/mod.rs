// src/storage/mod.rs

//! Storage abstractions for library records.
//!
//! The console never talks to a persistence mechanism directly; it goes
//! through [`LibraryStorage`], which has two backends:
//!
//! - [`RemoteStorage`]: the LMS HTTP API (the source of truth in production)
//! - [`LocalStorage`]: JSON files in the data directory
//!
//! ## Local Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Console configuration
//! ├── session.json          # Logged-in admin
//! ├── books.json
//! ├── readers.json
//! ├── transactions.json     # Append-only borrow/return log
//! └── admins.json           # Accounts with salted password digests
//! ```

pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Admin, Backend, Book, Config, LoginRequest, Reader, SignupRequest, Transaction};

// Re-export for convenience
pub use local::LocalStorage;
pub use remote::RemoteStorage;

/// Trait for library storage backends.
///
/// Mutations replace whole records; there are no partial updates.
#[async_trait]
pub trait LibraryStorage: Send + Sync {
    /// Short human-readable description of where data lives.
    fn describe(&self) -> String;

    async fn list_books(&self) -> Result<Vec<Book>>;

    async fn add_book(&self, book: &Book) -> Result<()>;

    /// Replace the book identified by `record_id`.
    async fn update_book(&self, record_id: &str, book: &Book) -> Result<()>;

    async fn remove_book(&self, record_id: &str) -> Result<()>;

    async fn list_readers(&self) -> Result<Vec<Reader>>;

    async fn add_reader(&self, reader: &Reader) -> Result<()>;

    async fn update_reader(&self, reader_id: u64, reader: &Reader) -> Result<()>;

    async fn delete_reader(&self, reader_id: u64) -> Result<()>;

    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// Record a borrow and take one copy off the shelf.
    async fn borrow_book(&self, isbn: &str, reader_id: u64) -> Result<()>;

    /// Record a return and put one copy back on the shelf.
    async fn return_book(&self, isbn: &str, reader_id: u64) -> Result<()>;

    /// Check credentials. `None` means the login details were invalid.
    async fn login(&self, request: &LoginRequest) -> Result<Option<Admin>>;

    async fn register_admin(&self, request: &SignupRequest) -> Result<Admin>;
}

/// Build the backend selected by the configuration.
pub fn from_config(config: &Config, data_dir: &std::path::Path) -> Result<Arc<dyn LibraryStorage>> {
    Ok(match config.storage.backend {
        Backend::Remote => Arc::new(RemoteStorage::new(&config.api)?),
        Backend::Local => Arc::new(LocalStorage::new(data_dir)),
    })
}
