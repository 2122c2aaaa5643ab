use serde::Deserialize;
use std::env;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://pdfs.db";
const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the PDF Q&A server.
///
/// Built once at process start and handed to each component constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection string for the relational store holding PDF records.
    pub database_url: String,
    /// Cloudinary account credentials.
    pub cloudinary: CloudinaryCredentials,
    /// Base URL of the Cloudinary upload API.
    pub cloudinary_api_base: String,
    /// API key for the Gemini generation API.
    pub gemini_api_key: String,
    /// Gemini model identifier used for summaries and answers.
    pub gemini_model: String,
    /// Base URL of the Gemini REST API.
    pub gemini_api_base: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Credentials parsed from a `cloudinary://<key>:<secret>@<cloud>` URL.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    /// Account cloud name used in upload and delivery URLs.
    pub cloud_name: String,
    /// Public API key.
    pub api_key: String,
    /// Secret used to sign upload requests.
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl std::str::FromStr for CloudinaryCredentials {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = reqwest::Url::parse(s.trim()).map_err(|_| ())?;
        if parsed.scheme() != "cloudinary" {
            return Err(());
        }
        let cloud_name = parsed.host_str().ok_or(())?.to_string();
        let api_key = parsed.username().to_string();
        let api_secret = parsed.password().ok_or(())?.to_string();
        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(());
        }
        Ok(Self {
            cloud_name,
            api_key,
            api_secret,
        })
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: load_env_optional("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            cloudinary: load_env("CLOUDINARY_URL")?
                .parse()
                .map_err(|()| ConfigError::InvalidValue("CLOUDINARY_URL".to_string()))?,
            cloudinary_api_base: load_env_optional("CLOUDINARY_API_BASE")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
            gemini_api_key: load_env("GEMINI_API_KEY")?,
            gemini_model: load_env_optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: load_env_optional("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Load `.env` (when present) and build the configuration from the environment.
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        database_url = %config.database_url,
        cloud_name = %config.cloudinary.cloud_name,
        gemini_model = %config.gemini_model,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(config)
}
