// src/policy/mod.rs

//! Loan accounting policy.
//!
//! Pure functions over an already-fetched transaction log:
//!
//! - **Outstanding loans**: a Borrow with no later Return for the same
//!   reader and book
//! - **Overdue loans**: outstanding and `today > borrowed_at + period`
//! - **Fines**: `overdue_days * fine_per_day`, where overdue days are whole
//!   days past the due date
//! - **Eligibility**: whether a borrow or return request may go through
//!
//! Nothing here performs I/O. Ineligible requests are reported as a
//! [`Rejection`], never as an error.

mod ledger;

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{LibrarySnapshot, Transaction};

pub use ledger::{LoanKey, LoanLedger};

/// State of a single (reader, book) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    NotBorrowed,
    Borrowed,
}

/// An outstanding loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    pub transaction_id: u64,
    pub reader_id: u64,
    pub isbn: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

/// An outstanding loan past its due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueLoan {
    #[serde(flatten)]
    pub loan: Loan,
    pub overdue_days: u64,
    pub fine: u64,
}

/// Why a borrow or return request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownBook { isbn: String },
    UnknownReader { reader_id: u64 },
    OutOfStock { isbn: String, title: String },
    AlreadyBorrowed { reader_id: u64, isbn: String },
    NotBorrowed { reader_id: u64, isbn: String },
}

impl Rejection {
    /// Short heading for the notification.
    pub fn title(&self) -> &'static str {
        match self {
            Self::UnknownBook { .. } => "Book Not Found",
            Self::UnknownReader { .. } => "Reader Not Found",
            Self::OutOfStock { .. } => "Book Out of Stock",
            Self::AlreadyBorrowed { .. } => "Book Already Borrowed",
            Self::NotBorrowed { .. } => "Book Not Borrowed",
        }
    }

    /// Full sentence for the notification body.
    pub fn description(&self) -> String {
        match self {
            Self::UnknownBook { isbn } => format!("No book with ISBN {isbn} exists."),
            Self::UnknownReader { reader_id } => format!("No reader with id {reader_id} exists."),
            Self::OutOfStock { title, .. } => {
                format!("\"{title}\" is currently out of stock.")
            }
            Self::AlreadyBorrowed { .. } => {
                "The reader has already borrowed this book and hasn't returned it yet.".to_string()
            }
            Self::NotBorrowed { .. } => {
                "No borrowed transaction found for this book by the reader.".to_string()
            }
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.description())
    }
}

/// Result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(Rejection),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// The rejection, if any.
    pub fn rejection(self) -> Option<Rejection> {
        match self {
            Self::Eligible => None,
            Self::Rejected(r) => Some(r),
        }
    }
}

/// Borrowing period and fine rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    borrowing_period_days: u32,
    fine_per_day: u64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self::new(2, 100)
    }
}

impl LoanPolicy {
    pub fn new(borrowing_period_days: u32, fine_per_day: u64) -> Self {
        Self {
            borrowing_period_days,
            fine_per_day,
        }
    }

    pub fn borrowing_period_days(&self) -> u32 {
        self.borrowing_period_days
    }

    pub fn fine_per_day(&self) -> u64 {
        self.fine_per_day
    }

    /// When a loan started at `borrowed_at` falls due.
    pub fn due_date(&self, borrowed_at: DateTime<Utc>) -> DateTime<Utc> {
        borrowed_at + Duration::days(i64::from(self.borrowing_period_days))
    }

    fn loan_from(&self, tx: &Transaction) -> Loan {
        Loan {
            transaction_id: tx.transaction_id,
            reader_id: tx.reader_id,
            isbn: tx.book_isbn.trim().to_string(),
            borrowed_at: tx.date,
            due_at: self.due_date(tx.date),
        }
    }

    /// Every outstanding loan in the log, oldest first.
    pub fn outstanding_loans(&self, log: &[Transaction]) -> Vec<Loan> {
        LoanLedger::replay(log)
            .open_borrows()
            .into_iter()
            .map(|tx| self.loan_from(tx))
            .collect()
    }

    /// Current state of a (reader, book) pair.
    pub fn loan_state(&self, log: &[Transaction], reader_id: u64, isbn: &str) -> LoanState {
        if LoanLedger::replay(log).is_open(reader_id, isbn) {
            LoanState::Borrowed
        } else {
            LoanState::NotBorrowed
        }
    }

    pub fn is_overdue(&self, loan: &Loan, today: DateTime<Utc>) -> bool {
        today > loan.due_at
    }

    /// Whole days past the due date; 0 when not overdue.
    pub fn overdue_days(&self, loan: &Loan, today: DateTime<Utc>) -> u64 {
        if !self.is_overdue(loan, today) {
            return 0;
        }
        u64::try_from((today - loan.due_at).num_days()).unwrap_or(0)
    }

    /// Fine for a number of overdue days.
    pub fn fine_for(&self, overdue_days: u64) -> u64 {
        overdue_days.saturating_mul(self.fine_per_day)
    }

    /// Outstanding loans past due, most overdue first.
    pub fn calculate_overdues(&self, log: &[Transaction], today: DateTime<Utc>) -> Vec<OverdueLoan> {
        let mut overdue: Vec<OverdueLoan> = self
            .outstanding_loans(log)
            .into_iter()
            .filter(|loan| self.is_overdue(loan, today))
            .map(|loan| {
                let overdue_days = self.overdue_days(&loan, today);
                OverdueLoan {
                    fine: self.fine_for(overdue_days),
                    overdue_days,
                    loan,
                }
            })
            .collect();
        overdue.sort_by(|a, b| {
            b.overdue_days
                .cmp(&a.overdue_days)
                .then_with(|| a.loan.transaction_id.cmp(&b.loan.transaction_id))
        });
        overdue
    }

    /// Sum of fines over all overdue loans.
    pub fn total_fines(&self, log: &[Transaction], today: DateTime<Utc>) -> u64 {
        self.calculate_overdues(log, today)
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.fine))
    }

    /// Whether `reader_id` may borrow `isbn` right now.
    pub fn check_borrow(&self, snapshot: &LibrarySnapshot, isbn: &str, reader_id: u64) -> Eligibility {
        if snapshot.reader(reader_id).is_none() {
            return Eligibility::Rejected(Rejection::UnknownReader { reader_id });
        }
        let Some(book) = snapshot.book(isbn) else {
            return Eligibility::Rejected(Rejection::UnknownBook {
                isbn: isbn.to_string(),
            });
        };
        if self.loan_state(&snapshot.transactions, reader_id, isbn) == LoanState::Borrowed {
            return Eligibility::Rejected(Rejection::AlreadyBorrowed {
                reader_id,
                isbn: book.isbn.clone(),
            });
        }
        if !book.in_stock() {
            return Eligibility::Rejected(Rejection::OutOfStock {
                isbn: book.isbn.clone(),
                title: book.title.clone(),
            });
        }
        Eligibility::Eligible
    }

    /// Whether `reader_id` may return `isbn` right now.
    pub fn check_return(&self, snapshot: &LibrarySnapshot, isbn: &str, reader_id: u64) -> Eligibility {
        if snapshot.reader(reader_id).is_none() {
            return Eligibility::Rejected(Rejection::UnknownReader { reader_id });
        }
        if snapshot.book(isbn).is_none() {
            return Eligibility::Rejected(Rejection::UnknownBook {
                isbn: isbn.to_string(),
            });
        }
        if self.loan_state(&snapshot.transactions, reader_id, isbn) == LoanState::NotBorrowed {
            return Eligibility::Rejected(Rejection::NotBorrowed {
                reader_id,
                isbn: isbn.to_string(),
            });
        }
        Eligibility::Eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Reader, ReaderStatus, TransactionKind};
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn book(isbn: &str, count: u32) -> Book {
        Book {
            book_id: None,
            isbn: isbn.to_string(),
            title: format!("Book {isbn}"),
            author: "Author".into(),
            category: "General".into(),
            count,
            price: 100.0,
            cover_url: None,
        }
    }

    fn reader(id: u64) -> Reader {
        Reader {
            reader_id: id,
            name: format!("Reader {id}"),
            email: format!("r{id}@example.com"),
            phone_no: "9876543210".into(),
            gender: "Female".into(),
            age: 30,
            status: ReaderStatus::Active,
        }
    }

    fn record(snapshot: &mut LibrarySnapshot, reader_id: u64, isbn: &str, at: DateTime<Utc>, kind: TransactionKind) {
        let id = snapshot.transactions.len() as u64 + 1;
        snapshot.transactions.push(Transaction {
            transaction_id: id,
            reader_id,
            book_isbn: isbn.to_string(),
            reader_name: None,
            book_name: None,
            date: at,
            kind,
        });
        if let Some(b) = snapshot.books.iter_mut().find(|b| b.has_isbn(isbn)) {
            match kind {
                TransactionKind::Borrow => b.count -= 1,
                TransactionKind::Return => b.count += 1,
            }
        }
    }

    fn library() -> LibrarySnapshot {
        LibrarySnapshot {
            books: vec![book("X", 1), book("Y", 3)],
            readers: vec![reader(1), reader(2)],
            transactions: Vec::new(),
        }
    }

    #[test]
    fn test_due_date_adds_period() {
        let policy = LoanPolicy::new(2, 100);
        assert_eq!(policy.due_date(day(0)), day(2));
    }

    #[test]
    fn test_not_overdue_has_no_fine() {
        let policy = LoanPolicy::default();
        let mut lib = library();
        record(&mut lib, 1, "Y", day(0), TransactionKind::Borrow);
        let loan = &policy.outstanding_loans(&lib.transactions)[0];

        // Exactly at the due instant is not yet overdue.
        assert!(!policy.is_overdue(loan, day(2)));
        assert_eq!(policy.overdue_days(loan, day(2)), 0);
        assert_eq!(policy.fine_for(policy.overdue_days(loan, day(1))), 0);
        assert!(policy.calculate_overdues(&lib.transactions, day(2)).is_empty());
    }

    #[test]
    fn test_overdue_days_are_floored() {
        let policy = LoanPolicy::new(2, 100);
        let mut lib = library();
        record(&mut lib, 1, "Y", day(0), TransactionKind::Borrow);
        let loan = &policy.outstanding_loans(&lib.transactions)[0];

        let half_day_late = day(2) + Duration::hours(12);
        assert!(policy.is_overdue(loan, half_day_late));
        assert_eq!(policy.overdue_days(loan, half_day_late), 0);

        let late = day(5) + Duration::hours(23);
        assert_eq!(policy.overdue_days(loan, late), 3);
        assert_eq!(policy.fine_for(3), 300);
    }

    #[test]
    fn test_fine_saturates() {
        let policy = LoanPolicy::new(1, u64::MAX);
        assert_eq!(policy.fine_for(2), u64::MAX);
    }

    #[test]
    fn test_out_of_stock_scenario() {
        let policy = LoanPolicy::default();
        let mut lib = library();

        assert!(policy.check_borrow(&lib, "X", 1).is_eligible());
        record(&mut lib, 1, "X", day(0), TransactionKind::Borrow);
        assert_eq!(lib.book("X").unwrap().count, 0);
        assert_eq!(policy.loan_state(&lib.transactions, 1, "X"), LoanState::Borrowed);

        let second = policy.check_borrow(&lib, "X", 2);
        assert!(matches!(
            second,
            Eligibility::Rejected(Rejection::OutOfStock { .. })
        ));
        assert_eq!(lib.book("X").unwrap().count, 0);
    }

    #[test]
    fn test_double_borrow_rejected() {
        let policy = LoanPolicy::default();
        let mut lib = library();
        record(&mut lib, 1, "Y", day(0), TransactionKind::Borrow);

        let again = policy.check_borrow(&lib, "Y", 1).rejection().unwrap();
        assert_eq!(again.title(), "Book Already Borrowed");
    }

    #[test]
    fn test_return_without_borrow_rejected() {
        let policy = LoanPolicy::default();
        let mut lib = library();
        let before = lib.book("Y").unwrap().count;

        let result = policy.check_return(&lib, "Y", 2);
        assert!(matches!(
            result,
            Eligibility::Rejected(Rejection::NotBorrowed { .. })
        ));
        assert_eq!(lib.book("Y").unwrap().count, before);

        // Someone else's loan of the same book does not count.
        record(&mut lib, 1, "Y", day(0), TransactionKind::Borrow);
        assert!(!policy.check_return(&lib, "Y", 2).is_eligible());
        assert!(policy.check_return(&lib, "Y", 1).is_eligible());
    }

    #[test]
    fn test_unknown_book_and_reader() {
        let policy = LoanPolicy::default();
        let lib = library();
        assert!(matches!(
            policy.check_borrow(&lib, "Z", 1),
            Eligibility::Rejected(Rejection::UnknownBook { .. })
        ));
        assert!(matches!(
            policy.check_borrow(&lib, "X", 99),
            Eligibility::Rejected(Rejection::UnknownReader { reader_id: 99 })
        ));
        assert!(matches!(
            policy.check_return(&lib, "Z", 1),
            Eligibility::Rejected(Rejection::UnknownBook { .. })
        ));
    }

    #[test]
    fn test_overdue_then_returned_scenario() {
        let policy = LoanPolicy::new(2, 100);
        let mut lib = library();
        record(&mut lib, 1, "Y", day(0), TransactionKind::Borrow);

        let overdue = policy.calculate_overdues(&lib.transactions, day(3));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].loan.isbn, "Y");
        assert_eq!(overdue[0].overdue_days, 1);
        assert_eq!(overdue[0].fine, 100);
        assert_eq!(policy.total_fines(&lib.transactions, day(3)), 100);

        assert!(policy.check_return(&lib, "Y", 1).is_eligible());
        record(&mut lib, 1, "Y", day(3), TransactionKind::Return);

        assert!(policy.calculate_overdues(&lib.transactions, day(3)).is_empty());
        assert!(policy.calculate_overdues(&lib.transactions, day(30)).is_empty());
        assert_eq!(policy.total_fines(&lib.transactions, day(30)), 0);
    }

    #[test]
    fn test_overdues_sorted_most_overdue_first() {
        let policy = LoanPolicy::new(1, 200);
        let mut lib = library();
        record(&mut lib, 1, "Y", day(2), TransactionKind::Borrow);
        record(&mut lib, 2, "Y", day(0), TransactionKind::Borrow);

        let overdue = policy.calculate_overdues(&lib.transactions, day(6));
        let readers: Vec<u64> = overdue.iter().map(|o| o.loan.reader_id).collect();
        assert_eq!(readers, [2, 1]);
        assert_eq!(overdue[0].fine, 1000);
        assert_eq!(policy.total_fines(&lib.transactions, day(6)), 1600);
    }

    #[test]
    fn test_random_requests_never_double_borrow() {
        let policy = LoanPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut lib = LibrarySnapshot {
            books: vec![book("A", 2), book("B", 1), book("C", 0)],
            readers: vec![reader(1), reader(2), reader(3)],
            transactions: Vec::new(),
        };
        let isbns = ["A", "B", "C"];

        for step in 0..500 {
            let isbn = isbns[rng.random_range(0..isbns.len())];
            let reader_id = rng.random_range(1..=3);
            let at = day(0) + Duration::minutes(step);
            let before = lib.book(isbn).unwrap().count;

            if rng.random_bool(0.5) {
                if policy.check_borrow(&lib, isbn, reader_id).is_eligible() {
                    record(&mut lib, reader_id, isbn, at, TransactionKind::Borrow);
                } else {
                    assert_eq!(lib.book(isbn).unwrap().count, before);
                }
            } else if policy.check_return(&lib, isbn, reader_id).is_eligible() {
                record(&mut lib, reader_id, isbn, at, TransactionKind::Return);
            } else {
                assert_eq!(lib.book(isbn).unwrap().count, before);
            }

            let loans = policy.outstanding_loans(&lib.transactions);
            let mut keys: Vec<(u64, &str)> =
                loans.iter().map(|l| (l.reader_id, l.isbn.as_str())).collect();
            let total = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), total, "double borrow at step {step}");
        }
    }
}
