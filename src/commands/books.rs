// src/commands/books.rs

use crate::error::{AppError, Result};
use crate::models::{Book, BookSort};
use crate::services::{LibraryService, search};
use crate::utils::console;

/// Field edits for `books update`; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub count: Option<u32>,
    pub price: Option<f64>,
    pub cover_url: Option<String>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none()
            && self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.count.is_none()
            && self.price.is_none()
            && self.cover_url.is_none()
    }

    /// The full replacement record.
    pub fn apply(self, current: Book) -> Book {
        Book {
            book_id: current.book_id,
            isbn: self.isbn.unwrap_or(current.isbn),
            title: self.title.unwrap_or(current.title),
            author: self.author.unwrap_or(current.author),
            category: self.category.unwrap_or(current.category),
            count: self.count.unwrap_or(current.count),
            price: self.price.unwrap_or(current.price),
            cover_url: self.cover_url.or(current.cover_url),
        }
    }
}

fn book_row(book: &Book) -> Vec<String> {
    vec![
        book.isbn.clone(),
        book.title.clone(),
        book.author.clone(),
        book.category.clone(),
        book.count.to_string(),
        format!("{:.2}", book.price),
    ]
}

/// List the catalog, optionally filtered and sorted.
pub async fn run_list_books(service: &LibraryService, term: Option<&str>, sort: Option<&str>) -> Result<()> {
    let sort = match sort {
        Some(raw) => BookSort::parse(raw).ok_or_else(|| {
            AppError::validation(format!(
                "unknown sort column '{raw}' (title, author, category, price, count)"
            ))
        })?,
        None => BookSort::default(),
    };

    let mut books = service.storage().list_books().await?;
    sort.apply(&mut books);
    let matches = search::books(&books, term.unwrap_or_default());

    console::header("Books");
    let rows: Vec<Vec<String>> = matches.iter().map(|b| book_row(b)).collect();
    console::table(
        &["ISBN", "Title", "Author", "Category", "Count", "Price"],
        &rows,
        "No books found",
    );
    console::summary(
        "Catalog",
        &[
            ("Shown", matches.len().to_string()),
            ("Total", books.len().to_string()),
        ],
    );
    Ok(())
}

pub async fn run_add_book(service: &LibraryService, book: Book) -> Result<()> {
    let book = service.add_book(book).await?;
    console::success(&format!("Book added: {} ({})", book.title, book.isbn));
    Ok(())
}

pub async fn run_update_book(service: &LibraryService, isbn: &str, changes: BookChanges) -> Result<()> {
    if changes.is_empty() {
        return Err(AppError::validation("nothing to update"));
    }
    let snapshot = service.snapshot().await?;
    let current = snapshot
        .book(isbn)
        .cloned()
        .ok_or_else(|| AppError::not_found("Book", isbn))?;

    let book = service.update_book(isbn, changes.apply(current)).await?;
    console::success(&format!("Book updated: {} ({})", book.title, book.isbn));
    if console::show_details() {
        console::table(
            &["ISBN", "Title", "Author", "Category", "Count", "Price"],
            &[book_row(&book)],
            "",
        );
    }
    Ok(())
}

pub async fn run_remove_book(service: &LibraryService, isbn: &str) -> Result<()> {
    let book = service.remove_book(isbn).await?;
    console::success(&format!("Book removed: {} ({})", book.title, book.isbn));
    Ok(())
}
