// src/services/library.rs

//! Library service.
//!
//! Glues the loan policy to a storage backend: every mutation is validated,
//! checked for eligibility against a fresh snapshot, sent to storage, and
//! followed by a re-fetch so the caller sees the source of truth.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{AppError, Result};
use crate::models::{Admin, Book, LibrarySnapshot, LoginRequest, Reader, SignupRequest};
use crate::policy::{Eligibility, Loan, LoanPolicy, OverdueLoan, Rejection};
use crate::storage::LibraryStorage;
use crate::validation;

/// Reader ids are six digits.
const READER_ID_RANGE: std::ops::RangeInclusive<u64> = 100_000..=999_999;

/// Result of a borrow or return request.
#[derive(Debug, Clone, PartialEq)]
pub enum LoanOutcome {
    /// The backend recorded the transaction.
    Completed {
        /// The book as the backend reports it afterwards
        book: Book,
        /// The loan opened (borrow) or closed (return)
        loan: Option<Loan>,
        /// Fine owed on the closed loan; always 0 for a borrow
        fine: u64,
    },
    /// The request was refused before reaching the backend.
    Rejected(Rejection),
}

/// An overdue loan with display names resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueRow {
    pub entry: OverdueLoan,
    pub reader_name: String,
    pub book_title: String,
}

/// All overdue loans and their combined fine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverdueReport {
    pub rows: Vec<OverdueRow>,
    pub total_fine: u64,
}

/// One outstanding loan of a single reader.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderLoan {
    pub loan: Loan,
    pub book_title: String,
    pub overdue_days: u64,
    pub fine: u64,
}

/// Pick a six-digit reader id not used by any existing reader.
pub fn assign_reader_id<R: Rng + ?Sized>(existing: &[Reader], rng: &mut R) -> Result<u64> {
    let taken: HashSet<u64> = existing.iter().map(|r| r.reader_id).collect();
    let capacity = (READER_ID_RANGE.end() - READER_ID_RANGE.start() + 1) as usize;
    if taken.iter().filter(|id| READER_ID_RANGE.contains(id)).count() >= capacity {
        return Err(AppError::conflict("no six-digit reader ids left"));
    }
    loop {
        let candidate = rng.random_range(READER_ID_RANGE);
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
    }
}

/// Service for library administration.
pub struct LibraryService {
    storage: Arc<dyn LibraryStorage>,
    policy: LoanPolicy,
}

impl LibraryService {
    pub fn new(storage: Arc<dyn LibraryStorage>, policy: LoanPolicy) -> Self {
        Self { storage, policy }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &dyn LibraryStorage {
        self.storage.as_ref()
    }

    /// Fetch books, readers and transactions concurrently.
    pub async fn snapshot(&self) -> Result<LibrarySnapshot> {
        let (books, readers, transactions) = futures::try_join!(
            self.storage.list_books(),
            self.storage.list_readers(),
            self.storage.list_transactions(),
        )?;
        log::debug!(
            "Snapshot: {} books, {} readers, {} transactions",
            books.len(),
            readers.len(),
            transactions.len()
        );
        Ok(LibrarySnapshot {
            books,
            readers,
            transactions,
        })
    }

    async fn find_book(&self, isbn: &str) -> Result<Book> {
        self.storage
            .list_books()
            .await?
            .into_iter()
            .find(|b| b.has_isbn(isbn))
            .ok_or_else(|| AppError::not_found("Book", isbn))
    }

    async fn find_reader(&self, reader_id: u64) -> Result<Reader> {
        self.storage
            .list_readers()
            .await?
            .into_iter()
            .find(|r| r.reader_id == reader_id)
            .ok_or_else(|| AppError::not_found("Reader", reader_id))
    }

    // ---------------------------------------------------------------------
    // Books
    // ---------------------------------------------------------------------

    pub async fn add_book(&self, book: Book) -> Result<Book> {
        validation::book(&book)?;
        let book = Book {
            isbn: book.isbn.trim().to_string(),
            ..book
        };
        self.storage.add_book(&book).await?;
        log::info!("Added book {} ({})", book.isbn, book.title);
        self.find_book(&book.isbn).await
    }

    /// Replace the book currently carrying `isbn`.
    ///
    /// The ISBN may only change to one no other record uses, and only while
    /// no copy of the book is on loan.
    pub async fn update_book(&self, isbn: &str, book: Book) -> Result<Book> {
        validation::book(&book)?;
        let snapshot = self.snapshot().await?;
        let existing = snapshot
            .book(isbn)
            .cloned()
            .ok_or_else(|| AppError::not_found("Book", isbn))?;
        let book = Book {
            book_id: existing.book_id.clone(),
            isbn: book.isbn.trim().to_string(),
            ..book
        };

        if !existing.has_isbn(&book.isbn) {
            if snapshot.book(&book.isbn).is_some() {
                return Err(AppError::conflict(format!(
                    "a book with ISBN {} already exists",
                    book.isbn
                )));
            }
            let on_loan = self
                .policy
                .outstanding_loans(&snapshot.transactions)
                .iter()
                .any(|l| existing.has_isbn(&l.isbn));
            if on_loan {
                return Err(AppError::conflict(format!(
                    "copies of {} are still on loan; the ISBN cannot change",
                    existing.isbn
                )));
            }
        }

        self.storage.update_book(existing.record_id(), &book).await?;
        log::info!("Updated book {}", existing.record_id());
        self.find_book(&book.isbn).await
    }

    pub async fn remove_book(&self, isbn: &str) -> Result<Book> {
        let existing = self.find_book(isbn).await?;
        self.storage.remove_book(existing.record_id()).await?;
        log::info!("Removed book {} ({})", existing.isbn, existing.title);
        Ok(existing)
    }

    // ---------------------------------------------------------------------
    // Readers
    // ---------------------------------------------------------------------

    /// Register a reader under a freshly assigned id. The incoming id is
    /// ignored.
    pub async fn add_reader(&self, reader: Reader) -> Result<Reader> {
        validation::reader(&reader)?;
        let existing = self.storage.list_readers().await?;
        let reader_id = assign_reader_id(&existing, &mut rand::rng())?;
        let reader = Reader { reader_id, ..reader };
        self.storage.add_reader(&reader).await?;
        log::info!("Added reader {} ({})", reader.reader_id, reader.name);
        self.find_reader(reader_id).await
    }

    pub async fn update_reader(&self, reader_id: u64, reader: Reader) -> Result<Reader> {
        validation::reader(&reader)?;
        self.find_reader(reader_id).await?;
        let reader = Reader { reader_id, ..reader };
        self.storage.update_reader(reader_id, &reader).await?;
        log::info!("Updated reader {}", reader_id);
        self.find_reader(reader_id).await
    }

    pub async fn delete_reader(&self, reader_id: u64) -> Result<Reader> {
        let existing = self.find_reader(reader_id).await?;
        self.storage.delete_reader(reader_id).await?;
        log::info!("Deleted reader {} ({})", reader_id, existing.name);
        Ok(existing)
    }

    // ---------------------------------------------------------------------
    // Loans
    // ---------------------------------------------------------------------

    fn open_loan(&self, snapshot: &LibrarySnapshot, reader_id: u64, isbn: &str) -> Option<Loan> {
        self.policy
            .outstanding_loans(&snapshot.transactions)
            .into_iter()
            .find(|l| l.reader_id == reader_id && l.isbn == isbn.trim())
    }

    /// Lend a copy of `isbn` to `reader_id`.
    pub async fn borrow(&self, isbn: &str, reader_id: u64) -> Result<LoanOutcome> {
        let snapshot = self.snapshot().await?;
        if let Eligibility::Rejected(rejection) = self.policy.check_borrow(&snapshot, isbn, reader_id) {
            log::warn!("Borrow refused: {}", rejection);
            return Ok(LoanOutcome::Rejected(rejection));
        }

        self.storage.borrow_book(isbn.trim(), reader_id).await?;

        let after = self.snapshot().await?;
        let book = after
            .book(isbn)
            .cloned()
            .ok_or_else(|| AppError::not_found("Book", isbn))?;
        Ok(LoanOutcome::Completed {
            loan: self.open_loan(&after, reader_id, isbn),
            book,
            fine: 0,
        })
    }

    /// Take back a copy of `isbn` from `reader_id`, settling the oldest open
    /// loan of that pair.
    pub async fn return_book(
        &self,
        isbn: &str,
        reader_id: u64,
        today: DateTime<Utc>,
    ) -> Result<LoanOutcome> {
        let snapshot = self.snapshot().await?;
        if let Eligibility::Rejected(rejection) = self.policy.check_return(&snapshot, isbn, reader_id) {
            log::warn!("Return refused: {}", rejection);
            return Ok(LoanOutcome::Rejected(rejection));
        }
        let loan = self.open_loan(&snapshot, reader_id, isbn);
        let fine = loan
            .as_ref()
            .map(|l| self.policy.fine_for(self.policy.overdue_days(l, today)))
            .unwrap_or(0);

        self.storage.return_book(isbn.trim(), reader_id).await?;
        if fine > 0 {
            log::info!("Reader {} owes {} for late return of {}", reader_id, fine, isbn);
        }

        let book = self.find_book(isbn).await?;
        Ok(LoanOutcome::Completed { book, loan, fine })
    }

    /// Every overdue loan as of `today`.
    pub async fn overdues(&self, today: DateTime<Utc>) -> Result<OverdueReport> {
        let snapshot = self.snapshot().await?;
        Ok(self.overdue_report(&snapshot, today))
    }

    /// Build the overdue report for an already fetched snapshot.
    pub fn overdue_report(&self, snapshot: &LibrarySnapshot, today: DateTime<Utc>) -> OverdueReport {
        let rows: Vec<OverdueRow> = self
            .policy
            .calculate_overdues(&snapshot.transactions, today)
            .into_iter()
            .map(|entry| OverdueRow {
                reader_name: snapshot.reader_name(entry.loan.reader_id),
                book_title: snapshot.book_title(&entry.loan.isbn),
                entry,
            })
            .collect();
        let total_fine = rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.entry.fine));
        OverdueReport { rows, total_fine }
    }

    /// Outstanding loans of one reader, oldest first.
    pub async fn reader_loans(&self, reader_id: u64, today: DateTime<Utc>) -> Result<Vec<ReaderLoan>> {
        let snapshot = self.snapshot().await?;
        if snapshot.reader(reader_id).is_none() {
            return Err(AppError::not_found("Reader", reader_id));
        }
        Ok(self
            .policy
            .outstanding_loans(&snapshot.transactions)
            .into_iter()
            .filter(|l| l.reader_id == reader_id)
            .map(|loan| {
                let overdue_days = self.policy.overdue_days(&loan, today);
                ReaderLoan {
                    book_title: snapshot.book_title(&loan.isbn),
                    fine: self.policy.fine_for(overdue_days),
                    overdue_days,
                    loan,
                }
            })
            .collect())
    }

    // ---------------------------------------------------------------------
    // Admins
    // ---------------------------------------------------------------------

    /// Check credentials. `None` means invalid login details.
    pub async fn login(&self, request: &LoginRequest) -> Result<Option<Admin>> {
        validation::login(request)?;
        self.storage.login(request).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<Admin> {
        validation::signup(request)?;
        let admin = self.storage.register_admin(request).await?;
        log::info!("Registered admin {}", admin.email);
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReaderStatus;
    use crate::storage::LocalStorage;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    fn book(isbn: &str, count: u32) -> Book {
        Book {
            book_id: None,
            isbn: isbn.to_string(),
            title: format!("Title {isbn}"),
            author: "Ursula K. Le Guin".into(),
            category: "Fantasy".into(),
            count,
            price: 450.0,
            cover_url: None,
        }
    }

    fn reader(name: &str) -> Reader {
        Reader {
            reader_id: 0,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_no: "9876543210".into(),
            gender: "Female".into(),
            age: 30,
            status: ReaderStatus::Active,
        }
    }

    fn service(tmp: &TempDir) -> LibraryService {
        LibraryService::new(
            Arc::new(LocalStorage::new(tmp.path())),
            LoanPolicy::default(),
        )
    }

    #[test]
    fn test_assign_reader_id_is_six_digits_and_unique() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut existing = Vec::new();
        for _ in 0..50 {
            let id = assign_reader_id(&existing, &mut rng).unwrap();
            assert!(READER_ID_RANGE.contains(&id));
            assert!(existing.iter().all(|r: &Reader| r.reader_id != id));
            existing.push(Reader {
                reader_id: id,
                ..reader("R")
            });
        }
    }

    #[tokio::test]
    async fn test_borrow_last_copy_then_out_of_stock() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441013597", 1)).await.unwrap();
        let r = svc.add_reader(reader("Ravi")).await.unwrap();
        let s = svc.add_reader(reader("Sita")).await.unwrap();

        let outcome = svc.borrow("0441013597", r.reader_id).await.unwrap();
        match outcome {
            LoanOutcome::Completed { book, loan, fine } => {
                assert_eq!(book.count, 0);
                assert_eq!(loan.unwrap().reader_id, r.reader_id);
                assert_eq!(fine, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let outcome = svc.borrow("0441013597", s.reader_id).await.unwrap();
        assert!(matches!(
            outcome,
            LoanOutcome::Rejected(Rejection::OutOfStock { .. })
        ));
        let snapshot = svc.snapshot().await.unwrap();
        assert_eq!(snapshot.book("0441013597").unwrap().count, 0);
        assert_eq!(snapshot.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_double_borrow_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441013597", 3)).await.unwrap();
        let r = svc.add_reader(reader("Ravi")).await.unwrap();

        svc.borrow("0441013597", r.reader_id).await.unwrap();
        let outcome = svc.borrow("0441013597", r.reader_id).await.unwrap();
        assert!(matches!(
            outcome,
            LoanOutcome::Rejected(Rejection::AlreadyBorrowed { .. })
        ));
    }

    #[tokio::test]
    async fn test_return_without_loan_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441013597", 2)).await.unwrap();
        let r = svc.add_reader(reader("Ravi")).await.unwrap();

        let outcome = svc
            .return_book("0441013597", r.reader_id, Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            LoanOutcome::Rejected(Rejection::NotBorrowed { .. })
        ));
        let snapshot = svc.snapshot().await.unwrap();
        assert_eq!(snapshot.book("0441013597").unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_late_return_reports_fine_and_clears_overdue() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441013597", 1)).await.unwrap();
        let r = svc.add_reader(reader("Ravi")).await.unwrap();
        svc.borrow("0441013597", r.reader_id).await.unwrap();

        let later = Utc::now() + Duration::days(5);
        let report = svc.overdues(later).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].reader_name, "Ravi");
        // Due two days after borrowing; five days later is three days late.
        assert_eq!(report.rows[0].entry.overdue_days, 3);
        assert_eq!(report.total_fine, 300);

        let loans = svc.reader_loans(r.reader_id, later).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].fine, 300);

        let outcome = svc
            .return_book("0441013597", r.reader_id, later)
            .await
            .unwrap();
        match outcome {
            LoanOutcome::Completed { book, fine, .. } => {
                assert_eq!(book.count, 1);
                assert_eq!(fine, 300);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(svc.overdues(later).await.unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn test_update_book_keeps_record_identity() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441013597", 1)).await.unwrap();

        let updated = svc
            .update_book(
                "0441013597",
                Book {
                    price: 499.0,
                    ..book("0441013597", 4)
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.count, 4);
        assert_eq!(updated.price, 499.0);
    }

    #[tokio::test]
    async fn test_update_book_rejects_isbn_of_another_record() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441172717", 1)).await.unwrap();
        svc.add_book(book("9781593278281", 2)).await.unwrap();

        let err = svc
            .update_book("9781593278281", book("0441172717", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let snapshot = svc.snapshot().await.unwrap();
        assert_eq!(snapshot.books.len(), 2);
        assert_eq!(snapshot.book("0441172717").unwrap().count, 1);
        assert!(snapshot.book("9781593278281").is_some());
    }

    #[tokio::test]
    async fn test_update_book_keeps_isbn_while_on_loan() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        svc.add_book(book("0441013597", 2)).await.unwrap();
        let r = svc.add_reader(reader("Ravi")).await.unwrap();
        svc.borrow("0441013597", r.reader_id).await.unwrap();

        let err = svc
            .update_book("0441013597", book("9780441013593", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Other fields can still change.
        let updated = svc
            .update_book("0441013597", book("0441013597", 5))
            .await
            .unwrap();
        assert_eq!(updated.count, 5);

        let outcome = svc
            .return_book("0441013597", r.reader_id, Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, LoanOutcome::Completed { .. }));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_storage() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);

        let err = svc.add_book(book("123", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(svc.snapshot().await.unwrap().books.is_empty());

        let err = svc.delete_reader(123456).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { kind: "Reader", .. }));
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);
        let request = SignupRequest {
            name: "Asha".into(),
            email: "asha@library.org".into(),
            gender: "Female".into(),
            phone_number: "9876543210".into(),
            password: "Secret@123".into(),
            confirm_password: "Secret@123".into(),
        };
        svc.signup(&request).await.unwrap();

        let admin = svc
            .login(&LoginRequest {
                email: "asha@library.org".into(),
                password: "Secret@123".into(),
            })
            .await
            .unwrap();
        assert_eq!(admin.unwrap().name, "Asha");

        let wrong = svc
            .login(&LoginRequest {
                email: "asha@library.org".into(),
                password: "Secret@124".into(),
            })
            .await
            .unwrap();
        assert!(wrong.is_none());
    }
}
