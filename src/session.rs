// src/session.rs

//! Logged-in admin session, persisted next to the local data files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Admin;
use crate::utils::fs;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub admin: Admin,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(admin: Admin) -> Self {
        Self {
            admin,
            logged_in_at: Utc::now(),
        }
    }

    fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SESSION_FILE)
    }

    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        fs::save_json(&Self::path(data_dir), self).await
    }

    /// Load the current session, if any.
    pub async fn load(data_dir: &Path) -> Result<Option<Self>> {
        fs::load_json(&Self::path(data_dir)).await
    }

    /// Load the current session or fail with [`AppError::Unauthorized`].
    pub async fn require(data_dir: &Path) -> Result<Self> {
        Self::load(data_dir).await?.ok_or(AppError::Unauthorized)
    }

    /// Remove the session file. Returns whether a session existed.
    pub async fn clear(data_dir: &Path) -> Result<bool> {
        fs::remove_file(&Self::path(data_dir)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn admin() -> Admin {
        Admin {
            name: "Asha".into(),
            email: "asha@library.org".into(),
            gender: "Female".into(),
            phone_number: "9876543210".into(),
        }
    }

    #[tokio::test]
    async fn test_require_without_session() {
        let tmp = TempDir::new().unwrap();
        let err = Session::require(tmp.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(admin());
        session.save(tmp.path()).await.unwrap();

        let loaded = Session::require(tmp.path()).await.unwrap();
        assert_eq!(loaded, session);

        assert!(Session::clear(tmp.path()).await.unwrap());
        assert!(Session::load(tmp.path()).await.unwrap().is_none());
        assert!(!Session::clear(tmp.path()).await.unwrap());
    }
}
