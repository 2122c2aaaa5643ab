//! Cloudinary upload client.
//!
//! PDFs are uploaded as `raw` resources through the signed upload API. The `secure_url` in the
//! upload response is returned unchanged so callers record exactly what Cloudinary stored.

use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{ObjectUploader, UploadError};
use crate::config::{CloudinaryCredentials, Config};

const PUBLIC_ID_PREFIX: &str = "pdfs";
const RESOURCE_KIND: &str = "raw";

/// Signed-upload client for a single Cloudinary account.
pub struct CloudinaryUploader {
    http: Client,
    api_base: String,
    credentials: CloudinaryCredentials,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryUploader {
    /// Build an uploader from the account credentials and API base in `config`.
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let http = Client::builder().user_agent("pdf-qa/upload").build()?;
        Ok(Self::with_client(
            http,
            config.cloudinary_api_base.clone(),
            config.cloudinary.clone(),
        ))
    }

    fn with_client(http: Client, api_base: String, credentials: CloudinaryCredentials) -> Self {
        Self {
            http,
            api_base,
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/{RESOURCE_KIND}/upload",
            self.api_base.trim_end_matches('/'),
            self.credentials.cloud_name
        )
    }
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, secret appended, SHA-1 hex.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|left, right| left.0.cmp(right.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ObjectUploader for CloudinaryUploader {
    async fn upload(&self, bytes: Vec<u8>, desired_name: &str) -> Result<String, UploadError> {
        let public_id = format!("{PUBLIC_ID_PREFIX}/{desired_name}");
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
            &self.credentials.api_secret,
        );
        let size = bytes.len();

        let file = Part::bytes(bytes)
            .file_name(desired_name.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new()
            .part("file", file)
            .text("public_id", public_id.clone())
            .text("timestamp", timestamp)
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = UploadError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, public_id = %public_id, "Cloudinary upload failed");
            return Err(error);
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|error| UploadError::InvalidResponse(error.to_string()))?;
        let url = payload
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| UploadError::InvalidResponse("missing secure_url".into()))?;

        tracing::info!(public_id = %public_id, bytes = size, url = %url, "PDF uploaded");
        Ok(url)
    }
}
