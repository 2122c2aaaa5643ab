#![deny(missing_docs)]

//! Core library for the PDF Q&A server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// PDF text extraction.
pub mod extract;
/// Text-generation client abstraction and the Gemini adapter.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Request metrics helpers.
pub mod metrics;
/// PDF service and the retrieval-and-QA pipeline.
pub mod pdfs;
/// Relational persistence for PDF records.
pub mod store;
/// Object store upload clients.
pub mod upload;
