//! HTTP plumbing shared by the REST resources.
//!
//! Each resource builds its own [`reqwest::Client`] with the configured
//! timeout, sets its own auth header, and funnels the request through
//! [`send_json`]. Failures come back as one of three kinds: the server
//! answered with a non-success status, the request never completed, or the
//! body was not JSON. There is no retry here.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Transport-level failure talking to a backend.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
    /// DNS, connect, TLS, timeout or any other failure before a status line.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The backend answered 2xx but the body was not valid JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),
    /// The client itself could not be constructed.
    #[error("invalid HTTP client settings: {0}")]
    Client(String),
}

impl HttpError {
    /// Status code for [`HttpError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body for [`HttpError::Status`], `None` otherwise.
    pub fn body(&self) -> Option<&str> {
        match self {
            HttpError::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

/// Build a client whose every request is bounded by `timeout_secs`.
pub fn build_client(timeout_secs: f64) -> Result<Client, HttpError> {
    let timeout = Duration::try_from_secs_f64(timeout_secs)
        .map_err(|e| HttpError::Client(format!("timeout {timeout_secs}s: {e}")))?;
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| HttpError::Client(e.to_string()))
}

/// Send `request` and decode the JSON body of a successful response.
///
/// An empty success body decodes to [`Value::Null`].
pub async fn send_json(request: RequestBuilder) -> Result<Value, HttpError> {
    let response = request
        .send()
        .await
        .map_err(|e| HttpError::Connection(e.to_string()))?;
    read_json(response).await
}

async fn read_json(response: Response) -> Result<Value, HttpError> {
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "backend responded");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| HttpError::Connection(e.to_string()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode(e.to_string()))
}
