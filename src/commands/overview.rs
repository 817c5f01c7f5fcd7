// src/commands/overview.rs

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Config;
use crate::services::{Dashboard, LibraryService, top_picks};
use crate::session::Session;
use crate::utils::{console, format_money};

/// Show library statistics and one pick per category.
pub async fn run_dashboard(service: &LibraryService, today: DateTime<Utc>, currency: &str) -> Result<()> {
    let snapshot = service.snapshot().await?;
    let dash = Dashboard::build(&snapshot, service.policy(), today);

    console::header("Dashboard");
    console::summary(
        "Catalog",
        &[
            ("Books", dash.total_books.to_string()),
            ("Copies on shelf", dash.copies_on_shelf.to_string()),
            ("Categories", dash.categories.to_string()),
        ],
    );
    console::summary(
        "Members",
        &[
            ("Readers", dash.total_readers.to_string()),
            ("Active readers", dash.active_readers.to_string()),
        ],
    );
    console::summary(
        "Loans",
        &[
            ("Transactions", dash.total_transactions.to_string()),
            ("Borrows", dash.total_borrows.to_string()),
            ("Borrows in the last 7 days", dash.recent_borrows.to_string()),
            ("Outstanding", dash.outstanding_loans.to_string()),
            ("Overdue", dash.overdue_loans.to_string()),
            ("Fines outstanding", format_money(currency, dash.outstanding_fines)),
        ],
    );
    console::summary(
        "Activity",
        &[
            ("Transactions", format!("{:.1}%", dash.activity.transactions)),
            ("Borrows", format!("{:.1}%", dash.activity.borrows)),
            ("Readers", format!("{:.1}%", dash.activity.readers)),
        ],
    );

    let picks = top_picks(&snapshot.books, &mut rand::rng());
    let rows: Vec<Vec<String>> = picks
        .iter()
        .map(|b| vec![b.category.clone(), b.title.clone(), b.author.clone()])
        .collect();
    console::header("Top Picks");
    console::table(&["Category", "Title", "Author"], &rows, "The catalog is empty");
    Ok(())
}

/// Validate the loaded configuration.
pub fn run_validate(config: &Config) -> Result<()> {
    console::header("Validating configuration");
    match config.validate() {
        Ok(()) => {
            console::success("Config OK");
            console::sub_item(&format!("API: {}", config.api.base_url));
            console::sub_item(&format!("Timeout: {}s", config.api.timeout_secs));
            console::sub_item(&format!(
                "Borrowing period: {} days",
                config.policy.borrowing_period_days
            ));
            console::sub_item(&format!(
                "Fine per day: {}",
                format_money(&config.policy.currency, config.policy.fine_per_day)
            ));
            console::sub_item(&format!("Backend: {:?}", config.storage.backend));
            Ok(())
        }
        Err(e) => {
            console::error(&format!("Config validation failed: {e}"));
            Err(e)
        }
    }
}

/// Show where data lives and who is logged in.
pub async fn run_info(service: &LibraryService, data_dir: &Path) -> Result<()> {
    console::info(&format!("Data directory: {}", data_dir.display()));
    console::info(&format!("Backend: {}", service.storage().describe()));
    match Session::load(data_dir).await? {
        Some(session) => console::info(&format!(
            "Logged in as {} since {}",
            session.admin.email,
            session.logged_in_at.format("%Y-%m-%d %H:%M UTC")
        )),
        None => console::info("Not logged in"),
    }
    Ok(())
}
