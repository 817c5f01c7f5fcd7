// src/services/dashboard.rs

//! Dashboard statistics and top picks.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::models::{Book, LibrarySnapshot};
use crate::policy::LoanPolicy;
use crate::utils::percentage;

/// Window for the "recent borrows" counter.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Shares shown on the activity chart, in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityShares {
    pub transactions: f64,
    pub borrows: f64,
    pub readers: f64,
}

/// Figures rendered on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_books: usize,
    /// Sum of copy counts currently on the shelf
    pub copies_on_shelf: u64,
    pub categories: usize,
    pub total_readers: usize,
    pub active_readers: usize,
    pub total_transactions: usize,
    pub total_borrows: usize,
    pub recent_borrows: usize,
    pub outstanding_loans: usize,
    pub overdue_loans: usize,
    pub outstanding_fines: u64,
    pub activity: ActivityShares,
}

impl Dashboard {
    pub fn build(snapshot: &LibrarySnapshot, policy: &LoanPolicy, today: DateTime<Utc>) -> Self {
        let categories: BTreeSet<&str> = snapshot
            .books
            .iter()
            .map(|b| b.category.trim())
            .filter(|c| !c.is_empty())
            .collect();

        let recent_cutoff = today - Duration::days(RECENT_WINDOW_DAYS);
        let total_borrows = snapshot.transactions.iter().filter(|t| t.is_borrow()).count();
        let recent_borrows = snapshot
            .transactions
            .iter()
            .filter(|t| t.is_borrow() && t.date > recent_cutoff && t.date <= today)
            .count();

        let overdues = policy.calculate_overdues(&snapshot.transactions, today);
        let outstanding_fines = overdues.iter().fold(0u64, |acc, o| acc.saturating_add(o.fine));

        let total_transactions = snapshot.transactions.len();
        let total_readers = snapshot.readers.len();
        // Shares are relative to everything counted on the chart.
        let activity_total = total_transactions + total_borrows + total_readers;

        Self {
            total_books: snapshot.books.len(),
            copies_on_shelf: snapshot.books.iter().map(|b| u64::from(b.count)).sum(),
            categories: categories.len(),
            total_readers,
            active_readers: snapshot.readers.iter().filter(|r| r.is_active()).count(),
            total_transactions,
            total_borrows,
            recent_borrows,
            outstanding_loans: policy.outstanding_loans(&snapshot.transactions).len(),
            overdue_loans: overdues.len(),
            outstanding_fines,
            activity: ActivityShares {
                transactions: percentage(total_transactions, activity_total),
                borrows: percentage(total_borrows, activity_total),
                readers: percentage(total_readers, activity_total),
            },
        }
    }
}

/// One randomly chosen book per category, ordered by category name.
pub fn top_picks<'a, R: Rng + ?Sized>(books: &'a [Book], rng: &mut R) -> Vec<&'a Book> {
    let mut by_category: BTreeMap<&str, Vec<&Book>> = BTreeMap::new();
    for book in books {
        let category = book.category.trim();
        if !category.is_empty() {
            by_category.entry(category).or_default().push(book);
        }
    }
    by_category
        .values()
        .filter_map(|group| group.choose(rng).copied())
        .collect()
}
