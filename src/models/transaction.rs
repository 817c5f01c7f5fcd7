// src/models/transaction.rs

//! Borrow/return transaction log entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::compat::{flexible_datetime, number_or_string, string_or_number};

/// Discriminator of a log entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(alias = "borrow")]
    Borrow,
    #[serde(alias = "return")]
    Return,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrow => f.write_str("Borrow"),
            Self::Return => f.write_str("Return"),
        }
    }
}

/// One entry of the append-only transaction log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "id", deserialize_with = "number_or_string")]
    pub transaction_id: u64,

    #[serde(alias = "userId", deserialize_with = "number_or_string")]
    pub reader_id: u64,

    #[serde(
        rename = "bookISBN",
        alias = "bookId",
        alias = "isbn",
        deserialize_with = "string_or_number"
    )]
    pub book_isbn: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,

    #[serde(deserialize_with = "flexible_datetime")]
    pub date: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn is_borrow(&self) -> bool {
        self.kind == TransactionKind::Borrow
    }

    pub fn is_return(&self) -> bool {
        self.kind == TransactionKind::Return
    }
}
