// src/commands/mod.rs

//! Command entry points for the console.
//!
//! - `auth`: sign up, log in/out, profile
//! - `books` / `readers`: catalog and membership management
//! - `loans`: borrow, return, transaction log, overdue report
//! - `overview`: dashboard, configuration check, backend info

pub mod auth;
pub mod books;
pub mod loans;
pub mod overview;
pub mod readers;

pub use auth::{run_login, run_logout, run_profile, run_signup};
pub use books::{BookChanges, run_add_book, run_list_books, run_remove_book, run_update_book};
pub use loans::{run_borrow, run_overdue, run_reader_loans, run_return, run_transactions};
pub use overview::{run_dashboard, run_info, run_validate};
pub use readers::{
    ReaderChanges, run_add_reader, run_delete_reader, run_list_readers, run_update_reader,
};
