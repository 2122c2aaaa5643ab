//! HTTP surface for PDF Q&A.
//!
//! - `POST /pdfs` – Create a record from a caller-supplied URL (`name`, `file`, optional `selected`).
//! - `POST /pdfs/upload` – Multipart upload (field `file`) to the object store, then create a record.
//! - `GET /pdfs` – List records; optional `?selected=true|false` filter.
//! - `GET|PUT|DELETE /pdfs/{id}` – Read, partially update, or delete one record.
//! - `POST /pdfs/summarize-text` – Summarize `{ "text": ... }` with the generation API.
//! - `POST /pdfs/qa-pdf/{id}` – Answer `{ "question": ... }` from the stored PDF's contents.
//! - `GET /metrics` – Request counters.
//! - `GET /commands` – Machine-readable command catalog.
//!
//! Errors are returned as `{ "detail": "<message>" }`.

use crate::metrics::MetricsSnapshot;
use crate::pdfs::{PdfApi, ServiceError};
use crate::store::{NewPdf, PdfRecord, PdfUpdate};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const UPLOAD_FIELD: &str = "file";

/// Build the HTTP router exposing the PDF API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PdfApi + 'static,
{
    Router::new()
        .route("/pdfs", get(list_pdfs::<S>).post(create_pdf::<S>))
        .route(
            "/pdfs/upload",
            post(upload_pdf::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/pdfs/summarize-text", post(summarize_text::<S>))
        .route("/pdfs/qa-pdf/:id", post(answer_question::<S>))
        .route(
            "/pdfs/:id",
            get(get_pdf::<S>).put(update_pdf::<S>).delete(delete_pdf::<S>),
        )
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Query parameters for `GET /pdfs`.
#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    selected: Option<bool>,
}

async fn create_pdf<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<NewPdf>,
) -> Result<(StatusCode, Json<PdfRecord>), AppError>
where
    S: PdfApi,
{
    let record = service.create_pdf(request).await?;
    tracing::info!(id = record.id, name = %record.name, "PDF record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Read the `file` field of a multipart body and hand it to the upload pipeline.
async fn upload_pdf<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PdfRecord>), AppError>
where
    S: PdfApi,
{
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ServiceError::BadRequest(format!("failed to read upload: {error}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|error| {
            ServiceError::BadRequest(format!("failed to read file data: {error}"))
        })?;
        tracing::debug!(filename = %filename, bytes = data.len(), "Received upload");

        let record = service.upload_pdf(&filename, data.to_vec()).await?;
        return Ok((StatusCode::CREATED, Json(record)));
    }

    Err(ServiceError::BadRequest(format!("no file provided; use multipart field '{UPLOAD_FIELD}'")).into())
}

async fn list_pdfs<S>(
    State(service): State<Arc<S>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PdfRecord>>, AppError>
where
    S: PdfApi,
{
    Ok(Json(service.list_pdfs(query.selected).await?))
}

async fn get_pdf<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<i64>,
) -> Result<Json<PdfRecord>, AppError>
where
    S: PdfApi,
{
    Ok(Json(service.get_pdf(id).await?))
}

async fn update_pdf<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<i64>,
    Json(update): Json<PdfUpdate>,
) -> Result<Json<PdfRecord>, AppError>
where
    S: PdfApi,
{
    Ok(Json(service.update_pdf(id, update).await?))
}

/// Response body for `DELETE /pdfs/{id}`.
#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn delete_pdf<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: PdfApi,
{
    service.delete_pdf(id).await?;
    Ok(Json(MessageResponse {
        message: "PDF successfully deleted",
    }))
}

/// Request body for `POST /pdfs/summarize-text`.
#[derive(Deserialize)]
struct SummarizeRequest {
    text: String,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: PdfApi,
{
    let summary = service.summarize(&request.text).await?;
    Ok(Json(SummarizeResponse { summary }))
}

/// Request body for `POST /pdfs/qa-pdf/{id}`.
#[derive(Deserialize)]
struct QuestionRequest {
    question: String,
}

#[derive(Serialize)]
struct AnswerResponse {
    answer: String,
}

/// Answer a question about the PDF behind record `id`.
///
/// The document is downloaded through the fallback ladder, its text extracted and capped, and
/// the composed prompt sent to the generation API.
async fn answer_question<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<i64>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>, AppError>
where
    S: PdfApi,
{
    let answer = service.answer(id, &request.question).await?;
    Ok(Json(AnswerResponse { answer }))
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: PdfApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery by hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "create_pdf",
                method: "POST",
                path: "/pdfs",
                description: "Create a PDF record pointing at an existing URL.",
                request_example: Some(json!({
                    "name": "handbook.pdf",
                    "selected": false,
                    "file": "https://res.cloudinary.com/<cloud>/raw/upload/v1/pdfs/handbook.pdf"
                })),
            },
            CommandDescriptor {
                name: "upload_pdf",
                method: "POST",
                path: "/pdfs/upload",
                description: "Upload a PDF as multipart field 'file'; the stored URL is recorded.",
                request_example: None,
            },
            CommandDescriptor {
                name: "list_pdfs",
                method: "GET",
                path: "/pdfs",
                description: "List PDF records in insertion order; filter with ?selected=true|false.",
                request_example: None,
            },
            CommandDescriptor {
                name: "get_pdf",
                method: "GET",
                path: "/pdfs/{id}",
                description: "Return one PDF record.",
                request_example: None,
            },
            CommandDescriptor {
                name: "update_pdf",
                method: "PUT",
                path: "/pdfs/{id}",
                description: "Partially update a record; omitted fields are left unchanged.",
                request_example: Some(json!({ "selected": true })),
            },
            CommandDescriptor {
                name: "delete_pdf",
                method: "DELETE",
                path: "/pdfs/{id}",
                description: "Delete a PDF record.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize_text",
                method: "POST",
                path: "/pdfs/summarize-text",
                description: "Summarize arbitrary text. Response returns { \"summary\": string }.",
                request_example: Some(json!({ "text": "Text to summarize" })),
            },
            CommandDescriptor {
                name: "qa_pdf",
                method: "POST",
                path: "/pdfs/qa-pdf/{id}",
                description: "Answer a question from the PDF's contents. Response returns { \"answer\": string }.",
                request_example: Some(json!({ "question": "What is the refund policy?" })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return upload, question, fallback, and summary counters.",
                request_example: None,
            },
        ],
    })
}

struct AppError(ServiceError);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidSource(_) | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::RetrievalFailed { .. }
            | ServiceError::ExtractionFailed(_)
            | ServiceError::Upload(_)
            | ServiceError::Generation(_)
            | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = %status, "Request rejected");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(inner: ServiceError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::metrics::MetricsSnapshot;
    use crate::pdfs::{PdfApi, ServiceError};
    use crate::store::{NewPdf, PdfRecord, PdfUpdate};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubPdfService {
        records: Mutex<Vec<PdfRecord>>,
        list_filters: Mutex<Vec<Option<bool>>>,
        uploads: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl StubPdfService {
        async fn seeded(records: Vec<PdfRecord>) -> Arc<Self> {
            let service = Arc::new(Self::default());
            *service.records.lock().await = records;
            service
        }
    }

    fn record(id: i64, file: &str) -> PdfRecord {
        PdfRecord {
            id,
            name: format!("doc-{id}.pdf"),
            selected: false,
            file: file.to_string(),
        }
    }

    #[async_trait]
    impl PdfApi for StubPdfService {
        async fn create_pdf(&self, pdf: NewPdf) -> Result<PdfRecord, ServiceError> {
            let mut records = self.records.lock().await;
            let created = PdfRecord {
                id: records.len() as i64 + 1,
                name: pdf.name,
                selected: pdf.selected,
                file: pdf.file,
            };
            records.push(created.clone());
            Ok(created)
        }

        async fn upload_pdf(
            &self,
            filename: &str,
            bytes: Vec<u8>,
        ) -> Result<PdfRecord, ServiceError> {
            self.uploads
                .lock()
                .await
                .push((filename.to_string(), bytes));
            self.create_pdf(NewPdf {
                name: filename.to_string(),
                selected: false,
                file: format!("https://cdn.example.com/{filename}"),
            })
            .await
        }

        async fn list_pdfs(&self, selected: Option<bool>) -> Result<Vec<PdfRecord>, ServiceError> {
            self.list_filters.lock().await.push(selected);
            Ok(self.records.lock().await.clone())
        }

        async fn get_pdf(&self, id: i64) -> Result<PdfRecord, ServiceError> {
            self.records
                .lock()
                .await
                .iter()
                .find(|record| record.id == id)
                .cloned()
                .ok_or(ServiceError::NotFound(id))
        }

        async fn update_pdf(&self, id: i64, update: PdfUpdate) -> Result<PdfRecord, ServiceError> {
            let mut records = self.records.lock().await;
            let record = records
                .iter_mut()
                .find(|record| record.id == id)
                .ok_or(ServiceError::NotFound(id))?;
            if let Some(selected) = update.selected {
                record.selected = selected;
            }
            Ok(record.clone())
        }

        async fn delete_pdf(&self, id: i64) -> Result<(), ServiceError> {
            let mut records = self.records.lock().await;
            let before = records.len();
            records.retain(|record| record.id != id);
            if records.len() == before {
                Err(ServiceError::NotFound(id))
            } else {
                Ok(())
            }
        }

        async fn summarize(&self, text: &str) -> Result<String, ServiceError> {
            Ok(format!("summary of {text}"))
        }

        async fn answer(&self, id: i64, question: &str) -> Result<String, ServiceError> {
            let record = self.get_pdf(id).await?;
            if record.file.is_empty() {
                return Err(ServiceError::InvalidSource("stored URL is empty".into()));
            }
            if record.file.contains("unreachable") {
                return Err(ServiceError::RetrievalFailed {
                    attempted: vec![record.file.clone()],
                    last_error: "unexpected status 404 Not Found".into(),
                });
            }
            Ok(format!("answer to {question}"))
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                questions_answered: 3,
                ..MetricsSnapshot::default()
            }
        }
    }

    async fn send(app: axum::Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response")
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn commands_catalog_exposes_qa_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let qa = commands
            .iter()
            .find(|cmd| cmd.name == "qa_pdf")
            .expect("qa command present");

        assert_eq!(qa.method, "POST");
        assert_eq!(qa.path, "/pdfs/qa-pdf/{id}");
        assert!(commands.len() >= 8);
    }

    #[tokio::test]
    async fn create_returns_created_record() {
        let service = Arc::new(StubPdfService::default());
        let response = send(
            create_router(service.clone()),
            Method::POST,
            "/pdfs",
            Some(json!({ "name": "a.pdf", "file": "https://files.example.com/a.pdf" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "a.pdf");
        assert_eq!(json["selected"], false);
        assert_eq!(json["file"], "https://files.example.com/a.pdf");
    }

    #[tokio::test]
    async fn list_forwards_selected_filter() {
        let service = StubPdfService::seeded(vec![record(1, "https://x/1.pdf")]).await;

        let response = send(
            create_router(service.clone()),
            Method::GET,
            "/pdfs?selected=true",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(create_router(service.clone()), Method::GET, "/pdfs", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(*service.list_filters.lock().await, vec![Some(true), None]);
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let service = Arc::new(StubPdfService::default());
        let response = send(create_router(service), Method::GET, "/pdfs/7", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["detail"], "PDF not found");
    }

    #[tokio::test]
    async fn update_and_delete_round_through_router() {
        let service = StubPdfService::seeded(vec![record(1, "https://x/1.pdf")]).await;

        let response = send(
            create_router(service.clone()),
            Method::PUT,
            "/pdfs/1",
            Some(json!({ "selected": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["selected"], true);
        assert_eq!(json["name"], "doc-1.pdf");

        let response = send(create_router(service.clone()), Method::DELETE, "/pdfs/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "PDF successfully deleted");

        let response = send(create_router(service), Method::DELETE, "/pdfs/1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn qa_maps_error_kinds_to_status_codes() {
        let service = StubPdfService::seeded(vec![
            record(1, "https://files.example.com/1.pdf"),
            record(2, ""),
            record(3, "https://unreachable.example.com/3.pdf"),
        ])
        .await;
        let question = json!({ "question": "What is it?" });

        let ok = send(
            create_router(service.clone()),
            Method::POST,
            "/pdfs/qa-pdf/1",
            Some(question.clone()),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(json_body(ok).await["answer"], "answer to What is it?");

        let invalid = send(
            create_router(service.clone()),
            Method::POST,
            "/pdfs/qa-pdf/2",
            Some(question.clone()),
        )
        .await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let failed = send(
            create_router(service.clone()),
            Method::POST,
            "/pdfs/qa-pdf/3",
            Some(question.clone()),
        )
        .await;
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(failed).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("404"));

        let missing = send(
            create_router(service),
            Method::POST,
            "/pdfs/qa-pdf/99",
            Some(question),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summarize_returns_summary() {
        let service = Arc::new(StubPdfService::default());
        let response = send(
            create_router(service),
            Method::POST,
            "/pdfs/summarize-text",
            Some(json!({ "text": "long text" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["summary"], "summary of long text");
    }

    #[tokio::test]
    async fn upload_reads_file_field() {
        let service = Arc::new(StubPdfService::default());
        let boundary = "pdfqa-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"report.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.5 fake\r\n\
             --{boundary}--\r\n"
        );

        let response = create_router(service.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/pdfs/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["name"], "report.pdf");
        let uploads = service.uploads.lock().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "report.pdf");
        assert_eq!(uploads[0].1, b"%PDF-1.5 fake");
    }

    #[tokio::test]
    async fn upload_without_file_field_is_bad_request() {
        let service = Arc::new(StubPdfService::default());
        let boundary = "pdfqa-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             value\r\n\
             --{boundary}--\r\n"
        );

        let response = create_router(service.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/pdfs/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.uploads.lock().await.is_empty());
    }

    #[tokio::test]
    async fn metrics_endpoint_serializes_snapshot() {
        let service = Arc::new(StubPdfService::default());
        let response = send(create_router(service), Method::GET, "/metrics", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["questions_answered"], 3);
        assert_eq!(json["pdfs_uploaded"], 0);
    }
}
