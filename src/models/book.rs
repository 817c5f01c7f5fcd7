// src/models/book.rs

//! Book catalog record.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::compat::{opt_string_or_number, string_or_number};

/// A title in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Backend record id, when the backend assigns one
    #[serde(
        rename = "bookId",
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub book_id: Option<String>,

    /// ISBN; the canonical identifier used by transactions
    #[serde(
        rename = "bookISBN",
        alias = "isbn",
        alias = "id",
        deserialize_with = "string_or_number"
    )]
    pub isbn: String,

    pub title: String,

    pub author: String,

    pub category: String,

    /// Copies currently on the shelf
    #[serde(rename = "bookCount", alias = "count")]
    pub count: u32,

    #[serde(default)]
    pub price: f64,

    /// Cover image URL
    #[serde(
        rename = "bookURL",
        alias = "bookPic",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_url: Option<String>,
}

impl Book {
    /// Identifier used in update/remove routes.
    pub fn record_id(&self) -> &str {
        self.book_id.as_deref().unwrap_or(&self.isbn)
    }

    /// Whether this record carries the given ISBN.
    pub fn has_isbn(&self, isbn: &str) -> bool {
        self.isbn.trim() == isbn.trim()
    }

    pub fn in_stock(&self) -> bool {
        self.count > 0
    }
}

/// Column a book listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    #[default]
    Title,
    Author,
    Category,
    Price,
    Count,
}

impl BookSort {
    /// Parse a column name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "category" => Some(Self::Category),
            "price" => Some(Self::Price),
            "count" | "bookcount" => Some(Self::Count),
            _ => None,
        }
    }

    fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
            Self::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            Self::Price => a.price.total_cmp(&b.price),
            Self::Count => a.count.cmp(&b.count),
        }
    }

    /// Sort books in place by this column, ties broken by ISBN.
    pub fn apply(self, books: &mut [Book]) {
        books.sort_by(|a, b| self.compare(a, b).then_with(|| a.isbn.cmp(&b.isbn)));
    }
}
