//! PDF records, uploads, and the retrieval-and-QA pipeline.

pub mod fallback;
pub mod fetch;
pub mod prompt;
mod service;
pub mod types;

pub use fetch::{DocumentFetcher, HttpFetcher};
pub use service::{PdfApi, PdfService};
pub use types::{FetchError, FetchedDocument, ServiceError};
