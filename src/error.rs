// src/error.rs

//! Unified error handling for the library console.

use std::fmt;

use thiserror::Error;

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The LMS API answered with a non-success status
    #[error("API error ({status}) during {context}")]
    Api { status: u16, context: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form/input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record lookup failed
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Record already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No admin is logged in
    #[error("Not logged in. Run 'lms login' first")]
    Unauthorized,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a conflict error.
    pub fn conflict(message: impl fmt::Display) -> Self {
        Self::Conflict(message.to_string())
    }

    /// Create a not-found error for a record kind.
    pub fn not_found(kind: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create an API status error with context.
    pub fn api(status: reqwest::StatusCode, context: impl Into<String>) -> Self {
        Self::Api {
            status: status.as_u16(),
            context: context.into(),
        }
    }
}
