// src/commands/loans.rs

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::policy::Rejection;
use crate::services::{LibraryService, LoanOutcome, search};
use crate::utils::{console, format_date, format_money};

fn report_rejection(rejection: &Rejection) {
    console::warn(&format!("{}: {}", rejection.title(), rejection.description()));
}

/// Lend a book to a reader.
pub async fn run_borrow(service: &LibraryService, isbn: &str, reader_id: u64) -> Result<()> {
    match service.borrow(isbn, reader_id).await? {
        LoanOutcome::Completed { book, loan, .. } => {
            console::success(&format!(
                "Borrowed \"{}\" for reader {}",
                book.title, reader_id
            ));
            if let Some(loan) = loan {
                console::sub_item(&format!("Due on {}", format_date(loan.due_at)));
            }
            console::sub_item(&format!("Copies left: {}", book.count));
        }
        LoanOutcome::Rejected(rejection) => report_rejection(&rejection),
    }
    Ok(())
}

/// Take a book back from a reader and report any fine owed.
pub async fn run_return(
    service: &LibraryService,
    isbn: &str,
    reader_id: u64,
    today: DateTime<Utc>,
    currency: &str,
) -> Result<()> {
    match service.return_book(isbn, reader_id, today).await? {
        LoanOutcome::Completed { book, fine, .. } => {
            console::success(&format!(
                "Returned \"{}\" from reader {}",
                book.title, reader_id
            ));
            if fine > 0 {
                console::warn(&format!("Late return, fine owed: {}", format_money(currency, fine)));
            }
            console::sub_item(&format!("Copies on shelf: {}", book.count));
        }
        LoanOutcome::Rejected(rejection) => report_rejection(&rejection),
    }
    Ok(())
}

/// Print the transaction log, newest first.
pub async fn run_transactions(service: &LibraryService, term: Option<&str>) -> Result<()> {
    let snapshot = service.snapshot().await?;
    let mut entries = search::transactions(&snapshot.transactions, term.unwrap_or_default());
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.transaction_id.cmp(&a.transaction_id))
    });

    console::header("Transactions");
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|t| {
            vec![
                t.transaction_id.to_string(),
                format_date(t.date),
                t.kind.to_string(),
                t.reader_name
                    .clone()
                    .unwrap_or_else(|| snapshot.reader_name(t.reader_id)),
                t.book_name
                    .clone()
                    .unwrap_or_else(|| snapshot.book_title(&t.book_isbn)),
                t.book_isbn.clone(),
            ]
        })
        .collect();
    console::table(
        &["#", "Date", "Type", "Reader", "Book", "ISBN"],
        &rows,
        "No transactions found",
    );
    Ok(())
}

/// Print every overdue loan and the total fine.
pub async fn run_overdue(service: &LibraryService, today: DateTime<Utc>, currency: &str) -> Result<()> {
    let report = service.overdues(today).await?;

    console::header("Overdue Loans");
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| {
            vec![
                row.reader_name.clone(),
                row.book_title.clone(),
                format_date(row.entry.loan.borrowed_at),
                format_date(row.entry.loan.due_at),
                row.entry.overdue_days.to_string(),
                format_money(currency, row.entry.fine),
            ]
        })
        .collect();
    console::table(
        &["Reader", "Book", "Borrowed", "Due", "Days", "Fine"],
        &rows,
        "No overdue loans",
    );
    console::summary(
        "Fines",
        &[
            ("Overdue loans", report.rows.len().to_string()),
            ("Total outstanding", format_money(currency, report.total_fine)),
            (
                "Rate",
                format!(
                    "{} per day after {} days",
                    format_money(currency, service.policy().fine_per_day()),
                    service.policy().borrowing_period_days()
                ),
            ),
        ],
    );
    Ok(())
}

/// Print one reader's outstanding loans.
pub async fn run_reader_loans(
    service: &LibraryService,
    reader_id: u64,
    today: DateTime<Utc>,
    currency: &str,
) -> Result<()> {
    let loans = service.reader_loans(reader_id, today).await?;

    console::header(&format!("Loans of reader {reader_id}"));
    let rows: Vec<Vec<String>> = loans
        .iter()
        .map(|l| {
            vec![
                l.loan.isbn.clone(),
                l.book_title.clone(),
                format_date(l.loan.borrowed_at),
                format_date(l.loan.due_at),
                l.overdue_days.to_string(),
                format_money(currency, l.fine),
            ]
        })
        .collect();
    console::table(
        &["ISBN", "Book", "Borrowed", "Due", "Overdue days", "Fine"],
        &rows,
        "No outstanding loans",
    );
    let owed = loans.iter().fold(0u64, |acc, l| acc.saturating_add(l.fine));
    console::summary(
        "Reader",
        &[
            ("Outstanding loans", loans.len().to_string()),
            ("Fine owed", format_money(currency, owed)),
        ],
    );
    Ok(())
}
