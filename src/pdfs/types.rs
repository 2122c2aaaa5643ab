//! Error and outcome types shared by the PDF service and its HTTP surface.

use crate::{
    extract::ExtractionError, generation::GenerationClientError, store::StoreError,
    upload::UploadError,
};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors emitted by [`crate::pdfs::PdfService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No record exists for the requested id.
    #[error("PDF not found")]
    NotFound(i64),
    /// The stored URL is empty or not an absolute HTTP(S) URL.
    #[error("Invalid PDF source: {0}")]
    InvalidSource(String),
    /// Caller input was rejected before any side effect.
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Every URL in the fallback ladder failed.
    #[error("Failed to retrieve PDF after {} attempt(s): {last_error}", attempted.len())]
    RetrievalFailed {
        /// URLs attempted, in ladder order.
        attempted: Vec<String>,
        /// Failure reported by the final attempt.
        last_error: String,
    },
    /// Downloaded bytes could not be turned into text.
    #[error("Failed to extract PDF text: {0}")]
    ExtractionFailed(#[from] ExtractionError),
    /// The object store rejected or failed the upload.
    #[error("Failed to upload file: {0}")]
    Upload(#[from] UploadError),
    /// The generation API failed.
    #[error("Generation request failed: {0}")]
    Generation(#[from] GenerationClientError),
    /// The record store failed.
    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

/// Errors produced by a single document fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP layer failed before receiving a response.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The host answered with a non-success status.
    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    /// The body exceeded the download cap.
    #[error("document larger than {limit} bytes")]
    TooLarge {
        /// Cap in bytes.
        limit: usize,
    },
}

/// Bytes obtained from the fallback ladder.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
    /// URL that answered successfully.
    pub url: String,
    /// One-based position of `url` in the ladder.
    pub attempt: usize,
}
