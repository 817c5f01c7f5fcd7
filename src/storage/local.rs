// src/storage/local.rs

//! Local filesystem storage implementation.
//!
//! Keeps each collection in its own JSON file, the way the early console kept
//! them in browser storage. Useful for offline work, demos and tests.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── books.json
//! ├── readers.json
//! ├── transactions.json
//! └── admins.json
//! ```
//!
//! Every file is rewritten atomically. Read-modify-write sequences are
//! serialized by an in-process lock; two processes sharing a directory can
//! still race.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Admin, Book, LoginRequest, Reader, SignupRequest, Transaction, TransactionKind};
use crate::policy::LoanLedger;
use crate::storage::LibraryStorage;
use crate::utils::fs;

const BOOKS: &str = "books.json";
const READERS: &str = "readers.json";
const TRANSACTIONS: &str = "transactions.json";
const ADMINS: &str = "admins.json";

/// Stored account: identity plus salted password digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdminRecord {
    #[serde(flatten)]
    admin: Admin,
    salt: String,
    password_digest: String,
}

impl AdminRecord {
    fn new(admin: Admin, password: &str) -> Self {
        let salt: [u8; 16] = rand::rng().random();
        let salt = hex::encode(salt);
        let password_digest = digest_password(&salt, password);
        Self {
            admin,
            salt,
            password_digest,
        }
    }

    fn verify(&self, password: &str) -> bool {
        digest_password(&self.salt, password) == self.password_digest
    }
}

/// Hex SHA-256 of `salt:password`.
fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    root_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Read a collection; a missing file is an empty collection.
    async fn read_all<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(fs::load_json(&self.path(key)).await?.unwrap_or_default())
    }

    async fn write_all<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        fs::save_json(&self.path(key), items).await?;
        log::debug!("Wrote {} records to {}", items.len(), key);
        Ok(())
    }

    /// Persist a copy-count change together with its log entry.
    ///
    /// Both collections must already be loaded. The log is written first and
    /// restored if the books file cannot be written.
    async fn commit_loan(
        &self,
        mut entries: Vec<Transaction>,
        books: &[Book],
        book: &Book,
        reader: &Reader,
        kind: TransactionKind,
    ) -> Result<Transaction> {
        let previous_len = entries.len();
        let next_id = entries.iter().map(|t| t.transaction_id).max().unwrap_or(0) + 1;
        let tx = Transaction {
            transaction_id: next_id,
            reader_id: reader.reader_id,
            book_isbn: book.isbn.clone(),
            reader_name: Some(reader.name.clone()),
            book_name: Some(book.title.clone()),
            date: Utc::now(),
            kind,
        };
        entries.push(tx.clone());
        self.write_all(TRANSACTIONS, &entries).await?;

        if let Err(e) = self.write_all(BOOKS, books).await {
            entries.truncate(previous_len);
            if let Err(restore) = self.write_all(TRANSACTIONS, &entries).await {
                log::error!(
                    "Could not roll back transaction #{}: {}",
                    tx.transaction_id,
                    restore
                );
            }
            return Err(e);
        }
        Ok(tx)
    }

    async fn find_reader(&self, reader_id: u64) -> Result<Reader> {
        let readers: Vec<Reader> = self.read_all(READERS).await?;
        readers
            .into_iter()
            .find(|r| r.reader_id == reader_id)
            .ok_or_else(|| AppError::not_found("Reader", reader_id))
    }
}

#[async_trait]
impl LibraryStorage for LocalStorage {
    fn describe(&self) -> String {
        format!("local files in {}", self.root_dir.display())
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        self.read_all(BOOKS).await
    }

    async fn add_book(&self, book: &Book) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut books: Vec<Book> = self.read_all(BOOKS).await?;
        if books.iter().any(|b| b.has_isbn(&book.isbn)) {
            return Err(AppError::conflict(format!(
                "a book with ISBN {} already exists",
                book.isbn
            )));
        }
        books.push(book.clone());
        self.write_all(BOOKS, &books).await
    }

    async fn update_book(&self, record_id: &str, book: &Book) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut books: Vec<Book> = self.read_all(BOOKS).await?;
        let index = books
            .iter()
            .position(|b| b.record_id() == record_id)
            .ok_or_else(|| AppError::not_found("Book", record_id))?;

        let old_isbn = books[index].isbn.clone();
        if !book.has_isbn(&old_isbn) {
            let taken = books
                .iter()
                .enumerate()
                .any(|(i, b)| i != index && b.has_isbn(&book.isbn));
            if taken {
                return Err(AppError::conflict(format!(
                    "a book with ISBN {} already exists",
                    book.isbn
                )));
            }
            let entries: Vec<Transaction> = self.read_all(TRANSACTIONS).await?;
            if LoanLedger::replay(&entries).has_open_isbn(&old_isbn) {
                return Err(AppError::conflict(format!(
                    "copies of {old_isbn} are still on loan; the ISBN cannot change"
                )));
            }
        }

        books[index] = book.clone();
        self.write_all(BOOKS, &books).await
    }

    async fn remove_book(&self, record_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut books: Vec<Book> = self.read_all(BOOKS).await?;
        let before = books.len();
        books.retain(|b| b.record_id() != record_id);
        if books.len() == before {
            return Err(AppError::not_found("Book", record_id));
        }
        self.write_all(BOOKS, &books).await
    }

    async fn list_readers(&self) -> Result<Vec<Reader>> {
        self.read_all(READERS).await
    }

    async fn add_reader(&self, reader: &Reader) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut readers: Vec<Reader> = self.read_all(READERS).await?;
        if readers.iter().any(|r| r.reader_id == reader.reader_id) {
            return Err(AppError::conflict(format!(
                "reader id {} is already taken",
                reader.reader_id
            )));
        }
        readers.push(reader.clone());
        self.write_all(READERS, &readers).await
    }

    async fn update_reader(&self, reader_id: u64, reader: &Reader) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut readers: Vec<Reader> = self.read_all(READERS).await?;
        let slot = readers
            .iter_mut()
            .find(|r| r.reader_id == reader_id)
            .ok_or_else(|| AppError::not_found("Reader", reader_id))?;
        *slot = reader.clone();
        self.write_all(READERS, &readers).await
    }

    async fn delete_reader(&self, reader_id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut readers: Vec<Reader> = self.read_all(READERS).await?;
        let before = readers.len();
        readers.retain(|r| r.reader_id != reader_id);
        if readers.len() == before {
            return Err(AppError::not_found("Reader", reader_id));
        }
        self.write_all(READERS, &readers).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.read_all(TRANSACTIONS).await
    }

    async fn borrow_book(&self, isbn: &str, reader_id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let reader = self.find_reader(reader_id).await?;
        let entries: Vec<Transaction> = self.read_all(TRANSACTIONS).await?;
        if LoanLedger::replay(&entries).is_open(reader_id, isbn) {
            return Err(AppError::conflict(format!(
                "reader {reader_id} already has {isbn} on loan"
            )));
        }

        let mut books: Vec<Book> = self.read_all(BOOKS).await?;
        let book = books
            .iter_mut()
            .find(|b| b.has_isbn(isbn))
            .ok_or_else(|| AppError::not_found("Book", isbn))?;

        book.count = book
            .count
            .checked_sub(1)
            .ok_or_else(|| AppError::conflict(format!("book {isbn} is out of stock")))?;
        let book = book.clone();

        let tx = self
            .commit_loan(entries, &books, &book, &reader, TransactionKind::Borrow)
            .await?;
        log::info!(
            "Recorded borrow #{}: {} -> reader {}",
            tx.transaction_id,
            book.isbn,
            reader_id
        );
        Ok(())
    }

    async fn return_book(&self, isbn: &str, reader_id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let reader = self.find_reader(reader_id).await?;
        let entries: Vec<Transaction> = self.read_all(TRANSACTIONS).await?;
        if !LoanLedger::replay(&entries).is_open(reader_id, isbn) {
            return Err(AppError::conflict(format!(
                "reader {reader_id} has no open loan of {isbn}"
            )));
        }

        let mut books: Vec<Book> = self.read_all(BOOKS).await?;
        let book = books
            .iter_mut()
            .find(|b| b.has_isbn(isbn))
            .ok_or_else(|| AppError::not_found("Book", isbn))?;
        book.count = book
            .count
            .checked_add(1)
            .ok_or_else(|| AppError::conflict(format!("copy count overflow for {isbn}")))?;
        let book = book.clone();

        let tx = self
            .commit_loan(entries, &books, &book, &reader, TransactionKind::Return)
            .await?;
        log::info!(
            "Recorded return #{}: {} <- reader {}",
            tx.transaction_id,
            book.isbn,
            reader_id
        );
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<Option<Admin>> {
        let admins: Vec<AdminRecord> = self.read_all(ADMINS).await?;
        let email = request.email.trim();
        Ok(admins
            .into_iter()
            .find(|a| a.admin.email.eq_ignore_ascii_case(email))
            .filter(|a| a.verify(&request.password))
            .map(|a| a.admin))
    }

    async fn register_admin(&self, request: &SignupRequest) -> Result<Admin> {
        let _guard = self.write_lock.lock().await;
        let mut admins: Vec<AdminRecord> = self.read_all(ADMINS).await?;
        let admin = request.admin();
        if admins
            .iter()
            .any(|a| a.admin.email.eq_ignore_ascii_case(&admin.email))
        {
            return Err(AppError::conflict(format!(
                "an account for {} already exists",
                admin.email
            )));
        }
        admins.push(AdminRecord::new(admin.clone(), &request.password));
        self.write_all(ADMINS, &admins).await?;
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReaderStatus;
    use tempfile::TempDir;

    fn book(isbn: &str, count: u32) -> Book {
        Book {
            book_id: None,
            isbn: isbn.to_string(),
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            category: "Sci-Fi".into(),
            count,
            price: 450.0,
            cover_url: None,
        }
    }

    fn reader(id: u64) -> Reader {
        Reader {
            reader_id: id,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone_no: "9876543210".into(),
            gender: "Female".into(),
            age: 24,
            status: ReaderStatus::Active,
        }
    }

    async fn seeded(tmp: &TempDir) -> LocalStorage {
        let storage = LocalStorage::new(tmp.path());
        storage.add_book(&book("0441172717", 1)).await.unwrap();
        storage.add_reader(&reader(123456)).await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_empty_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        assert!(storage.list_books().await.unwrap().is_empty());
        assert!(storage.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_isbn_rejected() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;
        let err = storage.add_book(&book("0441172717", 3)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_remove_book() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;

        let mut edited = book("0441172717", 4);
        edited.title = "Dune (Deluxe)".into();
        storage.update_book("0441172717", &edited).await.unwrap();
        assert_eq!(storage.list_books().await.unwrap()[0].title, "Dune (Deluxe)");

        storage.remove_book("0441172717").await.unwrap();
        assert!(storage.list_books().await.unwrap().is_empty());
        assert!(matches!(
            storage.remove_book("0441172717").await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_borrow_and_return_cycle() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;

        storage.borrow_book("0441172717", 123456).await.unwrap();
        assert_eq!(storage.list_books().await.unwrap()[0].count, 0);

        let err = storage.borrow_book("0441172717", 123456).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(storage.list_books().await.unwrap()[0].count, 0);

        storage.return_book("0441172717", 123456).await.unwrap();
        assert_eq!(storage.list_books().await.unwrap()[0].count, 1);

        let log = storage.list_transactions().await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].transaction_id, 1);
        assert!(log[0].is_borrow());
        assert_eq!(log[1].transaction_id, 2);
        assert!(log[1].is_return());
        assert_eq!(log[1].reader_name.as_deref(), Some("Asha"));
    }

    #[tokio::test]
    async fn test_return_without_loan_keeps_count() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;

        let err = storage.return_book("0441172717", 123456).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(storage.list_books().await.unwrap()[0].count, 1);
        assert!(storage.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_borrow_of_same_pair_rejected_with_stock_left() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.add_book(&book("0441172717", 3)).await.unwrap();
        storage.add_reader(&reader(123456)).await.unwrap();

        storage.borrow_book("0441172717", 123456).await.unwrap();
        let err = storage.borrow_book("0441172717", 123456).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert_eq!(storage.list_books().await.unwrap()[0].count, 2);
        let entries = storage.list_transactions().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(LoanLedger::replay(&entries).open_count(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_log_leaves_count_untouched() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;
        std::fs::write(tmp.path().join(TRANSACTIONS), "not json").unwrap();

        let err = storage.borrow_book("0441172717", 123456).await.unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
        assert_eq!(storage.list_books().await.unwrap()[0].count, 1);
    }

    #[tokio::test]
    async fn test_update_to_taken_isbn_rejected() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;
        storage.add_book(&book("9781593278281", 2)).await.unwrap();

        let err = storage
            .update_book("9781593278281", &book("0441172717", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let books = storage.list_books().await.unwrap();
        assert_eq!(books.iter().filter(|b| b.has_isbn("0441172717")).count(), 1);
        assert!(books.iter().any(|b| b.has_isbn("9781593278281")));
    }

    #[tokio::test]
    async fn test_isbn_change_blocked_while_on_loan() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;
        storage.borrow_book("0441172717", 123456).await.unwrap();

        let err = storage
            .update_book("0441172717", &book("9780441013593", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        storage.return_book("0441172717", 123456).await.unwrap();
        storage
            .update_book("0441172717", &book("9780441013593", 1))
            .await
            .unwrap();
        assert!(storage.list_books().await.unwrap()[0].has_isbn("9780441013593"));
    }

    #[tokio::test]
    async fn test_borrow_unknown_reader() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded(&tmp).await;
        let err = storage.borrow_book("0441172717", 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { kind: "Reader", .. }));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let signup = SignupRequest {
            name: "Suresh".into(),
            email: "suresh@example.com".into(),
            gender: "Male".into(),
            phone_number: "9876543210".into(),
            password: "Secret@123".into(),
            confirm_password: "Secret@123".into(),
        };
        storage.register_admin(&signup).await.unwrap();
        assert!(storage.register_admin(&signup).await.is_err());

        let raw = std::fs::read_to_string(tmp.path().join(ADMINS)).unwrap();
        assert!(!raw.contains("Secret@123"));

        let ok = storage
            .login(&LoginRequest {
                email: "SURESH@example.com".into(),
                password: "Secret@123".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.map(|a| a.name), Some("Suresh".to_string()));

        let bad = storage
            .login(&LoginRequest {
                email: "suresh@example.com".into(),
                password: "Wrong@1234".into(),
            })
            .await
            .unwrap();
        assert!(bad.is_none());
    }
}
