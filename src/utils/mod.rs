// src/utils/mod.rs

//! Utility functions and helpers.

pub mod console;
pub mod fs;
pub mod http;

use chrono::{DateTime, Utc};

/// Format a timestamp as a calendar date for listings.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format an amount with a currency symbol.
pub fn format_money(currency: &str, amount: u64) -> String {
    format!("{currency}{amount}")
}

/// Percentage of `part` in `total`, rounded to one decimal. 0 when total is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2026, 3, 4, 23, 59, 0).unwrap();
        assert_eq!(format_date(date), "2026-03-04");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 2), 100.0);
        assert_eq!(percentage(5, 0), 0.0);
    }
}
