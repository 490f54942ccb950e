//! Error types for the studybetter library.
//!
//! Two distinct error types reflect the two flows of the service:
//!
//! * [`AnalyzeError`] — failures of the analysis proxy: client input that
//!   cannot be validated, a missing credential, or one of the four upstream
//!   Mistral calls going wrong. Each variant maps to exactly one HTTP status
//!   and one `{error, details?}` response body in `server.rs`.
//!
//! * [`ExportError`] — failures of the export pipeline (PDF layout, Word
//!   packing). Export errors never carry upstream detail; the artifact is
//!   simply not produced.
//!
//! Cleanup failures (deleting the uploaded file) are deliberately NOT a
//! variant of either enum: deletion is advisory and is logged, never
//! propagated.

use thiserror::Error;

/// All errors returned by the analysis proxy.
///
/// The `detail` / `excerpt` fields carry a truncated copy of the upstream
/// response body so callers can diagnose Mistral-side failures without the
/// server having to log full payloads.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    // ── Client input errors (4xx) ─────────────────────────────────────────
    /// A required multipart field was absent from the request.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The `taskType` field was present but not a recognised task.
    #[error("Task type must be 'summarize' or 'explain', got '{value}'")]
    InvalidTaskType { value: String },

    /// The multipart body itself could not be read.
    #[error("Invalid form data: {detail}")]
    InvalidForm { detail: String },

    // ── Configuration errors (5xx) ────────────────────────────────────────
    /// No Mistral credential was configured at startup.
    #[error("Mistral API key is not configured")]
    ApiKeyMissing,

    /// A configuration value failed builder validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upstream errors (5xx) ─────────────────────────────────────────────
    /// The file upload to Mistral returned a non-success status.
    #[error("Failed to upload PDF file: {detail}")]
    UploadFailed { detail: String },

    /// The signed-URL request returned a non-success status.
    #[error("Failed to get signed URL: {detail}")]
    SignedUrlFailed { detail: String },

    /// The agent completion returned a non-success status.
    ///
    /// `excerpt` is a ≤`detail_limit`-char slice of the upstream body,
    /// surfaced as the `details` field of the error response.
    #[error("Failed to process request: HTTP error {status}")]
    CompletionFailed { status: u16, excerpt: String },

    /// The agent completion returned 2xx but the body was not the expected
    /// JSON shape (unparsable, or no choices).
    #[error("Failed to parse response from agent API")]
    MalformedCompletion { excerpt: String },

    /// Deleting the uploaded file failed.
    ///
    /// Only ever logged by the analyze sequence; never reaches a response.
    #[error("Failed to delete uploaded file: {detail}")]
    CleanupFailed { detail: String },

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("Failed to process request: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AnalyzeError {
    /// The truncated upstream excerpt for this error, if it carries one.
    ///
    /// Only completion-stage failures attach a `details` field to the
    /// response body; upload and signed-URL failures embed the upstream
    /// text in the message itself, mirroring the response contract.
    pub fn details(&self) -> Option<&str> {
        match self {
            AnalyzeError::CompletionFailed { excerpt, .. }
            | AnalyzeError::MalformedCompletion { excerpt } => Some(excerpt),
            _ => None,
        }
    }

    /// Whether this error is the caller's fault (maps to a 400).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyzeError::MissingField { .. }
                | AnalyzeError::InvalidTaskType { .. }
                | AnalyzeError::InvalidForm { .. }
        )
    }
}

/// All errors returned by the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    /// PDF layout or serialisation failed.
    #[error("PDF generation failed: {detail}")]
    Pdf { detail: String },

    /// Word document assembly or ZIP packing failed.
    #[error("Word document generation failed: {detail}")]
    Docx { detail: String },
}
