//! PDF service coordinating the record store, object store, extractor, and generation API.

use crate::{
    config::Config,
    extract::extract_text,
    generation::{GeminiClient, GenerationClient},
    metrics::{MetricsSnapshot, ServiceMetrics},
    pdfs::{
        fallback::{fallback_candidates, validate_source},
        fetch::{DocumentFetcher, HttpFetcher, fetch_first},
        prompt::{MAX_PROMPT_CHARS, question_prompt, summary_prompt, truncate_text},
        types::ServiceError,
    },
    store::{NewPdf, PdfRecord, PdfStore, PdfUpdate, SqlitePdfStore, create_pool},
    upload::{CloudinaryUploader, ObjectUploader},
};
use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

const DEFAULT_UPLOAD_NAME: &str = "document.pdf";

/// Owns the long-lived handles behind every `/pdfs` operation.
///
/// Construct once at process start and share through an `Arc`; each collaborator is safe for
/// concurrent use, so no locking happens here.
pub struct PdfService {
    store: Box<dyn PdfStore>,
    uploader: Box<dyn ObjectUploader>,
    fetcher: Box<dyn DocumentFetcher>,
    generator: Box<dyn GenerationClient>,
    metrics: ServiceMetrics,
}

/// Abstraction over the PDF service used by the HTTP surface.
#[async_trait]
pub trait PdfApi: Send + Sync {
    /// Create a record from caller-supplied metadata and URL.
    async fn create_pdf(&self, pdf: NewPdf) -> Result<PdfRecord, ServiceError>;

    /// Upload a PDF binary and create a record pointing at it.
    async fn upload_pdf(&self, filename: &str, bytes: Vec<u8>) -> Result<PdfRecord, ServiceError>;

    /// List records, optionally filtered on the `selected` flag.
    async fn list_pdfs(&self, selected: Option<bool>) -> Result<Vec<PdfRecord>, ServiceError>;

    /// Fetch one record.
    async fn get_pdf(&self, id: i64) -> Result<PdfRecord, ServiceError>;

    /// Apply a partial update.
    async fn update_pdf(&self, id: i64, update: PdfUpdate) -> Result<PdfRecord, ServiceError>;

    /// Delete a record.
    async fn delete_pdf(&self, id: i64) -> Result<(), ServiceError>;

    /// Summarize caller-supplied text.
    async fn summarize(&self, text: &str) -> Result<String, ServiceError>;

    /// Answer a question about the contents of a stored PDF.
    async fn answer(&self, id: i64, question: &str) -> Result<String, ServiceError>;

    /// Retrieve the current metrics snapshot.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PdfService {
    /// Assemble a service from explicit collaborators.
    pub fn new(
        store: Box<dyn PdfStore>,
        uploader: Box<dyn ObjectUploader>,
        fetcher: Box<dyn DocumentFetcher>,
        generator: Box<dyn GenerationClient>,
    ) -> Self {
        Self {
            store,
            uploader,
            fetcher,
            generator,
            metrics: ServiceMetrics::new(),
        }
    }

    /// Open the database and build the Cloudinary, HTTP, and Gemini clients described by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url)
            .await
            .with_context(|| format!("failed to open database {}", config.database_url))?;
        tracing::info!("Database ready");
        let uploader =
            CloudinaryUploader::new(config).context("failed to build Cloudinary client")?;
        let fetcher = HttpFetcher::new().context("failed to build download client")?;
        let generator = GeminiClient::new(config).context("failed to build Gemini client")?;
        tracing::info!(model = %config.gemini_model, "Generation client initialized");

        Ok(Self::new(
            Box::new(SqlitePdfStore::new(pool)),
            Box::new(uploader),
            Box::new(fetcher),
            Box::new(generator),
        ))
    }

    /// Create a record from caller-supplied metadata.
    pub async fn create_pdf(&self, pdf: NewPdf) -> Result<PdfRecord, ServiceError> {
        Ok(self.store.create(pdf).await?)
    }

    /// Upload `bytes` under a unique name and persist a record for the returned URL.
    ///
    /// No record is written when the upload fails.
    pub async fn upload_pdf(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<PdfRecord, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::BadRequest("uploaded file is empty".into()));
        }
        let filename = match filename.trim() {
            "" => DEFAULT_UPLOAD_NAME,
            name => name,
        };
        let desired_name = format!("{}-{filename}", Uuid::new_v4());

        let url = self.uploader.upload(bytes, &desired_name).await?;
        let record = self
            .store
            .create(NewPdf {
                name: filename.to_string(),
                selected: false,
                file: url,
            })
            .await?;

        self.metrics.record_upload();
        tracing::info!(id = record.id, name = %record.name, "Upload stored");
        Ok(record)
    }

    /// List records in insertion order.
    pub async fn list_pdfs(&self, selected: Option<bool>) -> Result<Vec<PdfRecord>, ServiceError> {
        Ok(self.store.list(selected).await?)
    }

    /// Fetch a single record or [`ServiceError::NotFound`].
    pub async fn get_pdf(&self, id: i64) -> Result<PdfRecord, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Apply the present fields of `update`.
    pub async fn update_pdf(&self, id: i64, update: PdfUpdate) -> Result<PdfRecord, ServiceError> {
        self.store
            .update(id, update)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Delete a record or report [`ServiceError::NotFound`].
    pub async fn delete_pdf(&self, id: i64) -> Result<(), ServiceError> {
        if self.store.delete(id).await? {
            tracing::info!(id, "PDF record deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }

    /// Forward `text` to the generation API inside the summary template.
    pub async fn summarize(&self, text: &str) -> Result<String, ServiceError> {
        let summary = self.generator.generate(&summary_prompt(text)).await?;
        self.metrics.record_summary();
        Ok(summary)
    }

    /// Download the record's PDF, extract its text, and ask the generation API `question`.
    pub async fn answer(&self, id: i64, question: &str) -> Result<String, ServiceError> {
        let record = self.get_pdf(id).await?;
        validate_source(&record.file).map_err(ServiceError::InvalidSource)?;

        let candidates = fallback_candidates(&record.file);
        let document = fetch_first(self.fetcher.as_ref(), &candidates).await?;
        if document.attempt > 1 {
            tracing::info!(
                id,
                stored = %record.file,
                resolved = %document.url,
                attempt = document.attempt,
                "PDF retrieved through fallback URL"
            );
        }

        let text = extract_text(&document.bytes)?;
        let truncated = truncate_text(&text);
        if truncated.len() < text.len() {
            tracing::debug!(id, limit = MAX_PROMPT_CHARS, "Truncated PDF text for prompt");
        }

        let prompt = question_prompt(&record.name, truncated, question);
        let answer = self.generator.generate(&prompt).await?;
        self.metrics.record_answer((document.attempt - 1) as u64);
        tracing::info!(id, attempt = document.attempt, "Question answered");
        Ok(answer)
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PdfApi for PdfService {
    async fn create_pdf(&self, pdf: NewPdf) -> Result<PdfRecord, ServiceError> {
        PdfService::create_pdf(self, pdf).await
    }

    async fn upload_pdf(&self, filename: &str, bytes: Vec<u8>) -> Result<PdfRecord, ServiceError> {
        PdfService::upload_pdf(self, filename, bytes).await
    }

    async fn list_pdfs(&self, selected: Option<bool>) -> Result<Vec<PdfRecord>, ServiceError> {
        PdfService::list_pdfs(self, selected).await
    }

    async fn get_pdf(&self, id: i64) -> Result<PdfRecord, ServiceError> {
        PdfService::get_pdf(self, id).await
    }

    async fn update_pdf(&self, id: i64, update: PdfUpdate) -> Result<PdfRecord, ServiceError> {
        PdfService::update_pdf(self, id, update).await
    }

    async fn delete_pdf(&self, id: i64) -> Result<(), ServiceError> {
        PdfService::delete_pdf(self, id).await
    }

    async fn summarize(&self, text: &str) -> Result<String, ServiceError> {
        PdfService::summarize(self, text).await
    }

    async fn answer(&self, id: i64, question: &str) -> Result<String, ServiceError> {
        PdfService::answer(self, id, question).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PdfService::metrics_snapshot(self)
    }
}
