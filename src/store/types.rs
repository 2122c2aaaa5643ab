//! Record types and errors for PDF persistence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database rejected or failed the statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Stored metadata for one uploaded or registered PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PdfRecord {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether the record is currently selected by the user.
    pub selected: bool,
    /// URL of the binary in the object store.
    pub file: String,
}

/// Fields required to create a record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPdf {
    /// Display name.
    pub name: String,
    /// Selection flag; defaults to `false` when omitted.
    #[serde(default)]
    pub selected: bool,
    /// URL of the binary in the object store.
    pub file: String,
}

/// Partial update; only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PdfUpdate {
    /// Replacement display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement selection flag.
    #[serde(default)]
    pub selected: Option<bool>,
    /// Replacement object store URL.
    #[serde(default)]
    pub file: Option<String>,
}
