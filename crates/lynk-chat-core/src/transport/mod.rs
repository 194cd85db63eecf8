//! Backend wire types and the transport seam
//!
//! Expected HTTP failures (non-2xx statuses) come back as
//! [`HttpOutcome::Rejected`]; only exchanges that could not complete at all
//! surface as [`TransportError`].

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback shown when an error body cannot be parsed
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub yaml: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetResponse {
    pub reply: String,
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub message: String,
}

/// Parsed error body. Only `detail` is meaningful.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Parse any JSON document; non-objects simply carry no detail.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
        Some(Self {
            detail: value.get("detail").cloned(),
        })
    }

    /// Human-readable detail, or `None` when absent or falsy (null, `""`, `false`, `0`)
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A non-2xx response from the backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRejection {
    pub status: u16,
    pub status_text: String,
    /// `None` when the body was not JSON
    pub body: Option<ErrorBody>,
}

impl BackendRejection {
    /// Detail, then status text, then a generic string when the body was unreadable.
    pub fn describe(&self) -> String {
        match &self.body {
            None => UNKNOWN_ERROR.to_string(),
            Some(body) => body
                .detail_text()
                .unwrap_or_else(|| self.status_text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HttpOutcome<T> {
    Success(T),
    Rejected(BackendRejection),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything the controller needs from the backend
#[async_trait]
pub trait Transport: Send + Sync {
    fn base_url(&self) -> &str;

    /// `POST /chat` with a JSON body
    async fn chat(&self, request: &ChatRequest) -> Result<HttpOutcome<ChatResponse>, TransportError>;

    /// `POST /reset` with no body
    async fn reset(&self) -> Result<HttpOutcome<ResetResponse>, TransportError>;

    /// `GET /`
    async fn health(&self) -> Result<HttpOutcome<HealthReport>, TransportError>;
}
