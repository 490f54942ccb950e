//! HTTP surface: the analysis proxy endpoint and the export downloads.
//!
//! ## Routes
//!
//! - `POST /api/analyze` — multipart `pdf` + `instructions` + `taskType`,
//!   returns `{"markdown": …}` or `{"error": …, "details"?: …}`
//! - `GET  /api/analyze` — 405 with a fixed advisory message
//! - `POST /api/export/pdf` — JSON body, responds with an attachment download
//! - `POST /api/export/docx` — same, Word flavour
//! - `GET  /api/health` — liveness probe
//!
//! Error mapping lives here: `AnalyzeError`/`ExportError` implement
//! `IntoResponse`, so handlers stay `Result`-shaped and the `{error,
//! details?}` body shape is produced in exactly one place.

use crate::analyze::{analyze, AnalysisRequest};
use crate::config::ServiceConfig;
use crate::error::{AnalyzeError, ExportError};
use crate::export::{self, output_file_name, ExportFormat};
use crate::mistral::MistralClient;
use crate::task::TaskType;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Uploads above this size are rejected by the body-limit layer.
///
/// The axum default (2 MB) is below a typical scanned lecture PDF.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared router state: the upstream client (which owns the config).
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: MistralClient,
}

/// Build the application router.
///
/// The config is injected here once, at startup; nothing else in the
/// request path reads the environment.
pub fn app(config: ServiceConfig) -> Result<Router, AnalyzeError> {
    let client = MistralClient::new(Arc::new(config))?;
    let state = AppState { client };

    Ok(Router::new()
        .route("/api/analyze", post(analyze_handler).get(analyze_usage))
        .route("/api/export/pdf", post(export_pdf_handler))
        .route("/api/export/docx", post(export_docx_handler))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state))
}

// ── Analysis endpoint ────────────────────────────────────────────────────

/// Success payload of the analysis endpoint.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub markdown: String,
}

async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AnalyzeError> {
    let mut pdf: Option<(String, Vec<u8>)> = None;
    let mut instructions: Option<String> = None;
    let mut task_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        // The field name borrows from the field; own it before the field
        // is consumed by `bytes()`/`text()`.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("pdf") => {
                let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                let bytes = field.bytes().await.map_err(invalid_form)?;
                pdf = Some((file_name, bytes.to_vec()));
            }
            Some("instructions") => {
                instructions = Some(field.text().await.map_err(invalid_form)?);
            }
            Some("taskType") => {
                task_raw = Some(field.text().await.map_err(invalid_form)?);
            }
            other => {
                debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    // Validation order is part of the contract: each missing field is
    // reported independently, and the credential is only checked once the
    // input is complete. The upstream is never contacted on any failure
    // here.
    let (file_name, pdf) = pdf.ok_or(AnalyzeError::MissingField { field: "PDF file" })?;
    let instructions = instructions.ok_or(AnalyzeError::MissingField {
        field: "Instructions",
    })?;
    let task: TaskType = task_raw
        .ok_or(AnalyzeError::MissingField { field: "Task type" })?
        .parse()?;

    if state.client.config().api_key.is_none() {
        return Err(AnalyzeError::ApiKeyMissing);
    }

    let markdown = analyze(
        &state.client,
        AnalysisRequest {
            file_name,
            pdf,
            instructions,
            task,
        },
    )
    .await?;

    Ok(Json(AnalysisResponse { markdown }))
}

/// Fixed 405 for GETs (page loads/refreshes hitting the API path).
async fn analyze_usage() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({
            "message": "This endpoint requires a POST request with PDF data"
        })),
    )
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> AnalyzeError {
    AnalyzeError::InvalidForm {
        detail: e.to_string(),
    }
}

// ── Export endpoints ─────────────────────────────────────────────────────

/// Request body shared by both export endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub markdown: String,
    pub file_name: String,
    pub task_type: TaskType,
}

async fn export_pdf_handler(Json(req): Json<ExportRequest>) -> Result<Response, ExportError> {
    let name = output_file_name(&req.file_name, req.task_type, ExportFormat::Pdf);
    // Layout is CPU-bound; keep it off the async worker threads.
    let bytes = tokio::task::spawn_blocking(move || {
        export::pdf::render_pdf(&req.markdown, &req.file_name, req.task_type)
    })
    .await
    .map_err(|e| ExportError::Pdf {
        detail: e.to_string(),
    })??;

    Ok(attachment(ExportFormat::Pdf, &name, bytes))
}

async fn export_docx_handler(Json(req): Json<ExportRequest>) -> Result<Response, ExportError> {
    let name = output_file_name(&req.file_name, req.task_type, ExportFormat::Docx);
    let bytes = tokio::task::spawn_blocking(move || {
        export::docx::render_docx(&req.markdown, &req.file_name, req.task_type)
    })
    .await
    .map_err(|e| ExportError::Docx {
        detail: e.to_string(),
    })??;

    Ok(attachment(ExportFormat::Docx, &name, bytes))
}

/// Wrap artifact bytes in a download response.
fn attachment(format: ExportFormat, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

// ── Health ───────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "studybetter",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Error mapping ────────────────────────────────────────────────────────

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Some(details) = self.details() {
            body["details"] = serde_json::Value::String(details.to_string());
        }
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
