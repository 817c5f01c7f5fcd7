// src/policy/ledger.rs

//! Replay of the transaction log into open loans.

use std::collections::{HashMap, VecDeque};

use crate::models::{Transaction, TransactionKind};

/// A (reader, book) pair; the unit a loan is tracked by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoanKey {
    pub reader_id: u64,
    pub isbn: String,
}

impl LoanKey {
    pub fn new(reader_id: u64, isbn: &str) -> Self {
        Self {
            reader_id,
            isbn: isbn.trim().to_string(),
        }
    }

    fn of(tx: &Transaction) -> Self {
        Self::new(tx.reader_id, &tx.book_isbn)
    }
}

/// Open borrows per pair, derived by replaying the log in time order.
///
/// Each Return closes the earliest still-open Borrow of its pair. A Return
/// with nothing open is ignored.
#[derive(Debug, Default)]
pub struct LoanLedger<'a> {
    open: HashMap<LoanKey, VecDeque<&'a Transaction>>,
    orphan_returns: usize,
}

impl<'a> LoanLedger<'a> {
    /// Replay a log. Entries are ordered by date, then transaction id.
    pub fn replay(log: &'a [Transaction]) -> Self {
        let mut ordered: Vec<&Transaction> = log.iter().collect();
        ordered.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });

        let mut ledger = Self::default();
        for tx in ordered {
            let key = LoanKey::of(tx);
            match tx.kind {
                TransactionKind::Borrow => ledger.open.entry(key).or_default().push_back(tx),
                TransactionKind::Return => {
                    let closed = ledger.open.get_mut(&key).and_then(VecDeque::pop_front);
                    if closed.is_none() {
                        ledger.orphan_returns += 1;
                        log::debug!(
                            "Ignoring return #{} (reader {}, book {}): no open borrow",
                            tx.transaction_id,
                            tx.reader_id,
                            tx.book_isbn
                        );
                    }
                }
            }
        }
        ledger.open.retain(|_, queue| !queue.is_empty());
        ledger
    }

    /// Whether the pair has at least one open borrow.
    pub fn is_open(&self, reader_id: u64, isbn: &str) -> bool {
        self.open.contains_key(&LoanKey::new(reader_id, isbn))
    }

    /// Whether any reader still holds a copy of `isbn`.
    pub fn has_open_isbn(&self, isbn: &str) -> bool {
        let isbn = isbn.trim();
        self.open.keys().any(|key| key.isbn == isbn)
    }

    /// All open borrows, oldest first.
    pub fn open_borrows(&self) -> Vec<&'a Transaction> {
        let mut borrows: Vec<&Transaction> = self.open.values().flatten().copied().collect();
        borrows.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        borrows
    }

    /// Number of open borrows across all pairs.
    pub fn open_count(&self) -> usize {
        self.open.values().map(VecDeque::len).sum()
    }

    /// Returns that matched no open borrow.
    pub fn orphan_returns(&self) -> usize {
        self.orphan_returns
    }
}
