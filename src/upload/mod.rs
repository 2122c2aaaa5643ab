//! Object store integration for PDF binaries.

mod cloudinary;

pub use cloudinary::CloudinaryUploader;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned while pushing a binary to the object store.
#[derive(Debug, Error)]
pub enum UploadError {
    /// HTTP layer failed before receiving a response.
    #[error("Upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The object store rejected the upload.
    #[error("Object store responded with {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the object store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The object store answered without a usable URL.
    #[error("Malformed upload response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by object store backends.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Store `bytes` under a name derived from `desired_name` and return its public URL.
    ///
    /// The returned URL is the one the store reports for the stored object and is fetchable as-is.
    async fn upload(&self, bytes: Vec<u8>, desired_name: &str) -> Result<String, UploadError>;
}
