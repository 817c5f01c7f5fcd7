// src/services/mod.rs

//! Service layer for the library console.
//!
//! This module contains the business logic for:
//! - Catalog, membership and loan management (`LibraryService`)
//! - Dashboard figures and top picks (`Dashboard`, `top_picks`)
//! - Listing filters (`search`)

mod dashboard;
mod library;
pub mod search;

pub use dashboard::{ActivityShares, Dashboard, top_picks};
pub use library::{
    LibraryService, LoanOutcome, OverdueReport, OverdueRow, ReaderLoan, assign_reader_id,
};
