// src/services/search.rs

//! Listing filters.
//!
//! A blank term matches everything.

use crate::models::{Book, Reader, Transaction};

fn normalize(term: &str) -> Option<String> {
    let term = term.trim();
    (!term.is_empty()).then(|| term.to_lowercase())
}

/// Books whose title, author or ISBN contains `term` (case-insensitive).
pub fn books<'a>(books: &'a [Book], term: &str) -> Vec<&'a Book> {
    let Some(needle) = normalize(term) else {
        return books.iter().collect();
    };
    books
        .iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&needle)
                || b.author.to_lowercase().contains(&needle)
                || b.isbn.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Readers whose name contains `term` (case-insensitive), or whose id does.
pub fn readers<'a>(readers: &'a [Reader], term: &str) -> Vec<&'a Reader> {
    let Some(needle) = normalize(term) else {
        return readers.iter().collect();
    };
    readers
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle) || r.reader_id.to_string().contains(&needle)
        })
        .collect()
}

/// Transactions whose reader id or ISBN contains `term`.
pub fn transactions<'a>(log: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
    let Some(needle) = normalize(term) else {
        return log.iter().collect();
    };
    log.iter()
        .filter(|t| {
            t.reader_id.to_string().contains(&needle) || t.book_isbn.to_lowercase().contains(&needle)
        })
        .collect()
}
