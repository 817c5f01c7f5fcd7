// src/models/mod.rs

//! Domain models for the library console.
//!
//! Every record type here is the canonical shape. Legacy shapes written by
//! older console revisions (numeric book ids, `userId`, lowercase transaction
//! types) are folded into it while deserializing; see [`compat`].

pub mod compat;
mod admin;
mod book;
mod config;
mod reader;
mod transaction;

// Re-export all public types
pub use admin::{Admin, LoginRequest, SignupRequest};
pub use book::{Book, BookSort};
pub use config::{
    API_URL_ENV, ApiConfig, Backend, Config, LoggingConfig, PolicyConfig, StorageConfig,
};
pub use reader::{Reader, ReaderStatus};
pub use transaction::{Transaction, TransactionKind};

/// Everything the console needs to render a screen, fetched in one go.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    pub books: Vec<Book>,
    pub readers: Vec<Reader>,
    pub transactions: Vec<Transaction>,
}

impl LibrarySnapshot {
    /// Find a book by ISBN.
    pub fn book(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.has_isbn(isbn))
    }

    /// Find a reader by id.
    pub fn reader(&self, reader_id: u64) -> Option<&Reader> {
        self.readers.iter().find(|r| r.reader_id == reader_id)
    }

    /// Display name for a reader id, falling back to the id itself.
    pub fn reader_name(&self, reader_id: u64) -> String {
        self.reader(reader_id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("#{reader_id}"))
    }

    /// Display title for an ISBN, falling back to the ISBN itself.
    pub fn book_title(&self, isbn: &str) -> String {
        self.book(isbn)
            .map(|b| b.title.clone())
            .unwrap_or_else(|| isbn.to_string())
    }
}
