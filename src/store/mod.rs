//! Relational persistence for PDF records.

mod sqlite;
pub mod types;

pub use sqlite::{SqlitePdfStore, create_pool};
pub use types::{NewPdf, PdfRecord, PdfUpdate, StoreError};

use async_trait::async_trait;

/// CRUD surface over the PDF record table.
///
/// Missing identifiers are reported as `None`/`false`; `Err` is reserved for database faults.
#[async_trait]
pub trait PdfStore: Send + Sync {
    /// Insert a new record and return it with its assigned id.
    async fn create(&self, pdf: NewPdf) -> Result<PdfRecord, StoreError>;

    /// List records in insertion order, optionally restricted to a `selected` value.
    async fn list(&self, selected: Option<bool>) -> Result<Vec<PdfRecord>, StoreError>;

    /// Fetch a single record.
    async fn get(&self, id: i64) -> Result<Option<PdfRecord>, StoreError>;

    /// Apply the present fields of `update` to the record.
    async fn update(&self, id: i64, update: PdfUpdate) -> Result<Option<PdfRecord>, StoreError>;

    /// Remove a record, returning whether it existed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
