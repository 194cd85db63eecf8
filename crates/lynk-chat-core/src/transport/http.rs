use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    BackendRejection, ChatRequest, ChatResponse, ErrorBody, HealthReport, HttpOutcome,
    ResetResponse, Transport, TransportError,
};

/// reqwest-backed transport for the feature backend
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Same as [`HttpTransport::new`] but with an overall request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Request {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn finish<T: DeserializeOwned>(
        &self,
        url: &str,
        response: Response,
    ) -> Result<HttpOutcome<T>, TransportError> {
        let status = response.status();

        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            // An unreadable body is treated the same as an unparseable one
            let body = match response.bytes().await {
                Ok(bytes) => ErrorBody::parse(&bytes),
                Err(_) => None,
            };
            warn!(url, status = status.as_u16(), "backend rejected request");
            return Ok(HttpOutcome::Rejected(BackendRejection {
                status: status.as_u16(),
                status_text,
                body,
            }));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let parsed = serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })?;

        Ok(HttpOutcome::Success(parsed))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn chat(&self, request: &ChatRequest) -> Result<HttpOutcome<ChatResponse>, TransportError> {
        let url = self.url("/chat");
        debug!(%url, chars = request.message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        self.finish(&url, response).await
    }

    async fn reset(&self) -> Result<HttpOutcome<ResetResponse>, TransportError> {
        let url = self.url("/reset");
        debug!(%url, "resetting conversation");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        self.finish(&url, response).await
    }

    async fn health(&self) -> Result<HttpOutcome<HealthReport>, TransportError> {
        let url = self.url("/");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        self.finish(&url, response).await
    }
}
