// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &ApiConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Send a request and turn non-success statuses into [`AppError::Api`].
pub async fn send_checked(request: RequestBuilder, context: &str) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        log::error!("{} failed with HTTP {}", context, status);
        return Err(AppError::api(status, context));
    }
    log::debug!("{} -> HTTP {}", context, status);
    Ok(response)
}
