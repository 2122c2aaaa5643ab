//! Downloading stored PDFs over HTTP, walking the fallback ladder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{FetchError, FetchedDocument, ServiceError};

/// Largest document body accepted from a stored URL.
pub const MAX_DOCUMENT_BYTES: usize = 50 * 1024 * 1024;
/// Upper bound on a single download, from connect to the last body byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Single-attempt retrieval of a document's bytes.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch `url`, succeeding only on a 2xx response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client.
pub struct HttpFetcher {
    http: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Construct a fetcher with the default timeout and body cap.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_limits(FETCH_TIMEOUT, MAX_DOCUMENT_BYTES)
    }

    /// Construct a fetcher that gives up after `timeout` or once a body exceeds `max_bytes`.
    pub fn with_limits(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent("pdf-qa/fetch")
            .timeout(timeout)
            .build()?;
        Ok(Self { http, max_bytes })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status));
        }
        if let Some(length) = response.content_length()
            && length > self.max_bytes as u64
        {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        // Content-Length may be absent or wrong; enforce the cap while streaming too.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// Try each candidate in order and return the first successful download.
pub async fn fetch_first(
    fetcher: &dyn DocumentFetcher,
    candidates: &[String],
) -> Result<FetchedDocument, ServiceError> {
    let mut attempted = Vec::with_capacity(candidates.len());
    let mut last_error = String::from("no candidate URLs");

    for (index, url) in candidates.iter().enumerate() {
        attempted.push(url.clone());
        match fetcher.fetch(url).await {
            Ok(bytes) => {
                tracing::debug!(url = %url, attempt = index + 1, bytes = bytes.len(), "PDF fetched");
                return Ok(FetchedDocument {
                    bytes,
                    url: url.clone(),
                    attempt: index + 1,
                });
            }
            Err(error) => {
                tracing::warn!(url = %url, attempt = index + 1, error = %error, "PDF fetch failed");
                last_error = format!("{url}: {error}");
            }
        }
    }

    Err(ServiceError::RetrievalFailed {
        attempted,
        last_error,
    })
}
