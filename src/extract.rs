//! Plain-text extraction from PDF bytes.

use lopdf::Document;
use thiserror::Error;

/// Errors produced while turning PDF bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The byte stream is not a parseable PDF document.
    #[error("Unreadable PDF: {0}")]
    Unreadable(String),
    /// The document parsed but no page yielded any text.
    #[error("PDF contains no extractable text")]
    NoText,
}

/// Extract the text of every page in document order, concatenated without separators.
///
/// Pages whose content cannot be decoded contribute nothing.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Unreadable("empty document".into()));
    }

    let document =
        Document::load_mem(bytes).map_err(|error| ExtractionError::Unreadable(error.to_string()))?;

    // `get_pages` is keyed by page number, so iteration follows document order.
    let pages = document.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(error) => {
                tracing::debug!(page = page_number, error = %error, "Skipping unreadable page");
            }
        }
    }

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }

    tracing::debug!(pages = pages.len(), chars = text.chars().count(), "Extracted PDF text");
    Ok(text)
}
