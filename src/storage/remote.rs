// src/storage/remote.rs

//! LMS HTTP API storage implementation.
//!
//! Talks to the backend's fixed routes:
//!
//! ```text
//! GET  LMS/Books/Get_All_Books              POST LMS/Books/Add_Book
//! POST LMS/Books/Update_Book/{id}           POST LMS/Books/Remove_Book/{id}
//! GET  LMS/Readers/Get_All_Readers          POST LMS/Readers/Add_Reader
//! POST LMS/Readers/Update_Reader/{id}       POST LMS/Readers/Delete_Reader/{id}
//! GET  LMS/Transactions/Get_All_Transaction
//! POST LMS/Transactions/Borrow_Book/{isbn}&{readerId}
//! POST LMS/Transactions/Return_Book/{isbn}&{readerId}
//! POST LMS/Admins/Login                     POST LMS/Admins/Register
//! ```
//!
//! The backend owns every business rule on its side; this client only maps
//! statuses to errors.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Admin, ApiConfig, Book, LoginRequest, Reader, SignupRequest, Transaction};
use crate::storage::LibraryStorage;
use crate::utils::http::{create_client, send_checked};

mod routes {
    pub const BOOKS: &str = "LMS/Books/Get_All_Books";
    pub const ADD_BOOK: &str = "LMS/Books/Add_Book";
    pub const UPDATE_BOOK: &str = "LMS/Books/Update_Book";
    pub const REMOVE_BOOK: &str = "LMS/Books/Remove_Book";
    pub const READERS: &str = "LMS/Readers/Get_All_Readers";
    pub const ADD_READER: &str = "LMS/Readers/Add_Reader";
    pub const UPDATE_READER: &str = "LMS/Readers/Update_Reader";
    pub const DELETE_READER: &str = "LMS/Readers/Delete_Reader";
    pub const TRANSACTIONS: &str = "LMS/Transactions/Get_All_Transaction";
    pub const BORROW: &str = "LMS/Transactions/Borrow_Book";
    pub const RETURN: &str = "LMS/Transactions/Return_Book";
    pub const LOGIN: &str = "LMS/Admins/Login";
    pub const REGISTER: &str = "LMS/Admins/Register";
    pub const LEGACY_REGISTER: &str = "LMS/Admins/Add_Admin";
}

/// HTTP-backed storage.
pub struct RemoteStorage {
    client: Client,
    base: Url,
    legacy_admin_routes: bool,
}

impl RemoteStorage {
    /// Create a client for the API described by `config`.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = create_client(config)?;
        Self::with_client(client, &config.base_url, config.legacy_admin_routes)
    }

    /// Create with an existing client.
    pub fn with_client(client: Client, base_url: &str, legacy_admin_routes: bool) -> Result<Self> {
        let mut base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(AppError::config(format!("api.base_url {base_url} cannot be a base")));
        }
        // Keep any path prefix when joining relative routes.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            legacy_admin_routes,
        })
    }

    /// Build the URL for a route, optionally with one trailing path segment.
    fn endpoint(&self, route: &str, tail: Option<&str>) -> Result<Url> {
        let mut url = self.base.join(route)?;
        if let Some(tail) = tail {
            url.path_segments_mut()
                .map_err(|_| AppError::config("api.base_url cannot be a base"))?
                .push(tail);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str, context: &str) -> Result<T> {
        let url = self.endpoint(route, None)?;
        log::debug!("GET {}", url);
        let response = send_checked(self.client.get(url), context).await?;
        Ok(response.json().await?)
    }

    async fn post(&self, url: Url, body: Option<&serde_json::Value>, context: &str) -> Result<()> {
        log::debug!("POST {}", url);
        let request = match body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.post(url),
        };
        send_checked(request, context).await?;
        Ok(())
    }

    fn loan_segment(isbn: &str, reader_id: u64) -> String {
        format!("{}&{}", isbn.trim(), reader_id)
    }
}

#[async_trait]
impl LibraryStorage for RemoteStorage {
    fn describe(&self) -> String {
        format!("LMS API at {}", self.base)
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        self.get_json(routes::BOOKS, "list books").await
    }

    async fn add_book(&self, book: &Book) -> Result<()> {
        let url = self.endpoint(routes::ADD_BOOK, None)?;
        self.post(url, Some(&serde_json::to_value(book)?), "add book").await
    }

    async fn update_book(&self, record_id: &str, book: &Book) -> Result<()> {
        let url = self.endpoint(routes::UPDATE_BOOK, Some(record_id))?;
        self.post(url, Some(&serde_json::to_value(book)?), "update book").await
    }

    async fn remove_book(&self, record_id: &str) -> Result<()> {
        let url = self.endpoint(routes::REMOVE_BOOK, Some(record_id))?;
        self.post(url, None, "remove book").await
    }

    async fn list_readers(&self) -> Result<Vec<Reader>> {
        self.get_json(routes::READERS, "list readers").await
    }

    async fn add_reader(&self, reader: &Reader) -> Result<()> {
        let url = self.endpoint(routes::ADD_READER, None)?;
        self.post(url, Some(&serde_json::to_value(reader)?), "add reader").await
    }

    async fn update_reader(&self, reader_id: u64, reader: &Reader) -> Result<()> {
        let url = self.endpoint(routes::UPDATE_READER, Some(&reader_id.to_string()))?;
        self.post(url, Some(&serde_json::to_value(reader)?), "update reader").await
    }

    async fn delete_reader(&self, reader_id: u64) -> Result<()> {
        let url = self.endpoint(routes::DELETE_READER, Some(&reader_id.to_string()))?;
        self.post(url, None, "delete reader").await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.get_json(routes::TRANSACTIONS, "list transactions").await
    }

    async fn borrow_book(&self, isbn: &str, reader_id: u64) -> Result<()> {
        let segment = Self::loan_segment(isbn, reader_id);
        let url = self.endpoint(routes::BORROW, Some(&segment))?;
        self.post(url, None, "borrow book").await
    }

    async fn return_book(&self, isbn: &str, reader_id: u64) -> Result<()> {
        let segment = Self::loan_segment(isbn, reader_id);
        let url = self.endpoint(routes::RETURN, Some(&segment))?;
        self.post(url, None, "return book").await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Option<Admin>> {
        let url = self.endpoint(routes::LOGIN, None)?;
        log::debug!("POST {}", url);
        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();

        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND
        ) {
            log::warn!("Login rejected with HTTP {}", status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::api(status, "login"));
        }

        // The backend answers with the admin record, a bare boolean, or nothing.
        let body = response.text().await?;
        let body = body.trim();
        if body.is_empty() {
            return Ok(Some(Admin {
                email: request.email.trim().to_string(),
                ..Admin::default()
            }));
        }
        match serde_json::from_str::<serde_json::Value>(body)? {
            serde_json::Value::Bool(false) | serde_json::Value::Null => Ok(None),
            serde_json::Value::Bool(true) => Ok(Some(Admin {
                email: request.email.trim().to_string(),
                ..Admin::default()
            })),
            value => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn register_admin(&self, request: &SignupRequest) -> Result<Admin> {
        let route = if self.legacy_admin_routes {
            routes::LEGACY_REGISTER
        } else {
            routes::REGISTER
        };
        let url = self.endpoint(route, None)?;
        self.post(url, Some(&serde_json::to_value(request)?), "register admin")
            .await?;
        Ok(request.admin())
    }
}
