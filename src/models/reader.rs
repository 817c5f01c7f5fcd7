// src/models/reader.rs

//! Library reader (member) record.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::compat::{number_or_string, string_or_number};

/// Membership status of a reader.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReaderStatus {
    #[default]
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "inactive")]
    Inactive,
}

impl ReaderStatus {
    /// Parse a status name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for ReaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Inactive => f.write_str("Inactive"),
        }
    }
}

/// A registered reader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reader {
    #[serde(alias = "userId", alias = "id", deserialize_with = "number_or_string")]
    pub reader_id: u64,

    pub name: String,

    pub email: String,

    /// Stored as text; the legacy console saved it as a number
    #[serde(deserialize_with = "string_or_number")]
    pub phone_no: String,

    pub gender: String,

    pub age: u32,

    #[serde(default)]
    pub status: ReaderStatus,
}

impl Reader {
    pub fn is_active(&self) -> bool {
        self.status == ReaderStatus::Active
    }
}
