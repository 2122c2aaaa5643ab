//! Prompt templates and the document-size guard.

/// Hard cap on document characters embedded in a question prompt.
pub const MAX_PROMPT_CHARS: usize = 100_000;

/// Keep the first [`MAX_PROMPT_CHARS`] characters of `text`, discarding the rest.
pub fn truncate_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Prompt asking the model to answer `question` from the contents of the named PDF.
pub fn question_prompt(document_name: &str, text: &str, question: &str) -> String {
    format!(
        "Based on the following content of the PDF \"{document_name}\":\n\n\
         {text}\n\n\
         Answer the following question: {question}\n"
    )
}

/// Prompt asking the model to summarize caller-supplied text.
pub fn summary_prompt(text: &str) -> String {
    format!("Provide a summary of the following text: {text}")
}
