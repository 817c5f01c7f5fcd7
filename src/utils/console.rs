// src/utils/console.rs

//! Console rendering with server-style formatting.
//!
//! Every line carries a timestamp and level so command output reads like a
//! log. Diagnostics go through the `log` facade instead; this module is for
//! what the admin asked to see.

use std::sync::OnceLock;

use chrono::Local;

use crate::models::LoggingConfig;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();
static SHOW_DETAILS: OnceLock<bool> = OnceLock::new();

/// Initialize console output from the `[logging]` section.
pub fn init(config: &LoggingConfig) {
    let _ = LOG_LEVEL.set(LogLevel::parse(&config.level));
    let _ = SHOW_DETAILS.set(config.show_details);
}

fn should_log(level: LogLevel) -> bool {
    let current = LOG_LEVEL.get().copied().unwrap_or(LogLevel::Info);
    level >= current
}

/// Whether per-record detail lines should be printed.
pub fn show_details() -> bool {
    SHOW_DETAILS.get().copied().unwrap_or(true)
}

fn format_line(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

pub fn info(message: &str) {
    if should_log(LogLevel::Info) {
        println!("{}", format_line(LogLevel::Info, message));
    }
}

pub fn warn(message: &str) {
    if should_log(LogLevel::Warn) {
        eprintln!("{}", format_line(LogLevel::Warn, message));
    }
}

pub fn error(message: &str) {
    if should_log(LogLevel::Error) {
        eprintln!("{}", format_line(LogLevel::Error, message));
    }
}

/// Log a success message (always shown as INFO)
pub fn success(message: &str) {
    println!("{}", format_line(LogLevel::Info, &format!("✓ {message}")));
}

/// Log a header
pub fn header(title: &str) {
    if should_log(LogLevel::Info) {
        let border = "═".repeat(60);
        println!("{}", format_line(LogLevel::Info, &border));
        println!("{}", format_line(LogLevel::Info, &format!("  {}", title)));
        println!("{}", format_line(LogLevel::Info, &border));
    }
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    if should_log(LogLevel::Info) {
        println!("{}", format_line(LogLevel::Info, &format!("    {}", message)));
    }
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if should_log(LogLevel::Info) {
        println!();
        println!("{}", format_line(LogLevel::Info, &format!("[SUMMARY] {}", title)));
        for (key, value) in items {
            println!("{}", format_line(LogLevel::Info, &format!("    {}: {}", key, value)));
        }
    }
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render rows as fixed-width columns. Cells wider than their column are kept
/// whole; the column simply grows.
pub fn render_table(columns: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_row(columns.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(pad_row(row.iter().map(String::as_str), &widths));
    }
    lines
}

/// Print a table, or a placeholder line when there are no rows.
pub fn table(columns: &[&str], rows: &[Vec<String>], empty: &str) {
    if rows.is_empty() {
        sub_item(empty);
        return;
    }
    for line in render_table(columns, rows) {
        sub_item(&line);
    }
}
