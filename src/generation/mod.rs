//! Hosted text-generation client used for summaries and question answering.
//!
//! The Gemini adapter issues `generateContent` requests directly over HTTP and returns the
//! candidate text untouched.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Errors surfaced while calling the generation API.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Provider could not be reached.
    #[error("Generation provider unavailable: {0}")]
    Unavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate content: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by text-generation providers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationClientError>;
}

/// Client for the Gemini REST API.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client for the model, key, and API base configured in `config`.
    pub fn new(config: &Config) -> Result<Self, GenerationClientError> {
        let http = Client::builder()
            .user_agent("pdf-qa/generate")
            .build()
            .map_err(|error| GenerationClientError::Unavailable(error.to_string()))?;
        Ok(Self {
            http,
            base_url: config.gemini_api_base.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationClientError> {
        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::Unavailable(format!(
                    "failed to reach Gemini at {}: {}",
                    self.base_url,
                    error.without_url()
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationClientError::GenerationFailed(format!(
                "Gemini model '{}' not found",
                self.model
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {}",
                error.without_url()
            ))
        })?;

        let text = body.into_text().ok_or_else(|| {
            GenerationClientError::InvalidResponse("Gemini response contained no text".into())
        })?;
        tracing::debug!(model = %self.model, chars = text.len(), "Generated content");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(base_url: String) -> GeminiClient {
        GeminiClient {
            http: Client::builder()
                .user_agent("pdf-qa-test")
                .build()
                .expect("client"),
            base_url,
            model: "gemini-test".into(),
            api_key: "secret-key".into(),
        }
    }

    #[tokio::test]
    async fn gemini_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:generateContent")
                    .header("x-goog-api-key", "secret-key")
                    .body_contains("What is inside?");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": "It is " }, { "text": "a report." }]
                        }
                    }]
                }));
            })
            .await;

        let text = client(server.base_url())
            .generate("What is inside?")
            .await
            .expect("generated");

        mock.assert_async().await;
        assert_eq!(text, "It is a report.");
    }

    #[tokio::test]
    async fn gemini_client_handles_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:generateContent");
                then.status(500).body("boom");
            })
            .await;

        let error = client(server.base_url())
            .generate("prompt")
            .await
            .expect_err("error response");

        assert!(
            matches!(error, GenerationClientError::GenerationFailed(ref message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn gemini_client_rejects_empty_candidates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:generateContent");
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let error = client(server.base_url())
            .generate("prompt")
            .await
            .expect_err("no text");
        assert!(matches!(error, GenerationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn gemini_client_reports_unknown_model() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:generateContent");
                then.status(404).body("models/gemini-test is not found");
            })
            .await;

        let error = client(server.base_url())
            .generate("prompt")
            .await
            .expect_err("unknown model");

        assert!(
            matches!(error, GenerationClientError::GenerationFailed(ref message) if message.contains("gemini-test"))
        );
    }

    #[tokio::test]
    async fn unreachable_provider_error_omits_api_key() {
        let error = client("http://127.0.0.1:1".into())
            .generate("hi")
            .await
            .expect_err("connection refused");
        assert!(matches!(error, GenerationClientError::Unavailable(_)));

        let rendered = crate::pdfs::ServiceError::from(error).to_string();
        assert!(rendered.contains("127.0.0.1:1"));
        assert!(!rendered.contains("secret-key"), "{rendered}");
    }

    #[tokio::test]
    async fn malformed_response_error_omits_api_key() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:generateContent");
                then.status(200).body("not json");
            })
            .await;

        let error = client(server.base_url())
            .generate("prompt")
            .await
            .expect_err("malformed body");

        assert!(matches!(error, GenerationClientError::InvalidResponse(_)));
        assert!(!error.to_string().contains("secret-key"));
    }
}
