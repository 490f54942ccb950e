//! Thin Mistral REST client: files + agent completions.
//!
//! The analysis proxy touches four endpoints — create file, get signed URL,
//! create agent completion, delete file — all bearer-authorized with the
//! configured credential. No provider crate covers the files/agents surface,
//! so this module wraps `reqwest` directly with serde wire types.
//!
//! ## Error excerpts
//!
//! The completion response is read as text *before* parsing so that a
//! non-2xx status or a malformed body can always be reported with a
//! truncated excerpt of what the upstream actually sent. Truncation is
//! char-boundary safe; cutting a multi-byte character in half would panic
//! on slice.

use crate::config::ServiceConfig;
use crate::error::AnalyzeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Opaque handle to a file uploaded to Mistral.
///
/// Exclusively owned by one analyze invocation: created at upload, deleted
/// (best-effort) at the end of the same request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub id: String,
}

/// Client for the Mistral files + agents API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference-counted and the
/// config is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MistralClient {
    http: reqwest::Client,
    config: Arc<ServiceConfig>,
}

impl MistralClient {
    /// Build a client from the service config.
    pub fn new(config: Arc<ServiceConfig>) -> Result<Self, AnalyzeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// The shared service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, AnalyzeError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(AnalyzeError::ApiKeyMissing)
    }

    /// Upload a document for OCR processing; returns the assigned handle.
    ///
    /// `POST /v1/files` with multipart fields `file` (bytes + original
    /// filename) and `purpose=ocr`.
    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, AnalyzeError> {
        let key = self.api_key()?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| AnalyzeError::UploadFailed {
                detail: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("purpose", "ocr");

        let response = self
            .http
            .post(format!("{}/v1/files", self.config.api_base_url))
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::UploadFailed { detail });
        }

        let body: FileUploadResponse =
            response.json().await.map_err(|e| AnalyzeError::UploadFailed {
                detail: e.to_string(),
            })?;
        debug!(file_id = %body.id, "file uploaded");
        Ok(UploadedFile { id: body.id })
    }

    /// Request a signed, time-limited retrieval URL for an uploaded file.
    ///
    /// `GET /v1/files/{id}/url`.
    pub async fn get_signed_url(&self, file: &UploadedFile) -> Result<String, AnalyzeError> {
        let key = self.api_key()?;
        let response = self
            .http
            .get(format!(
                "{}/v1/files/{}/url",
                self.config.api_base_url, file.id
            ))
            .bearer_auth(key)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::SignedUrlFailed { detail });
        }

        let body: SignedUrlResponse =
            response
                .json()
                .await
                .map_err(|e| AnalyzeError::SignedUrlFailed {
                    detail: e.to_string(),
                })?;
        debug!("signed URL obtained");
        Ok(body.url)
    }

    /// Submit an agent completion and extract the first choice's content.
    ///
    /// `POST /v1/agents/completions`. The body is read as text first: a
    /// non-success status or an unparsable body is reported with a
    /// truncated raw excerpt rather than a bare parse error.
    pub async fn agent_completion(
        &self,
        request: &AgentCompletionRequest,
    ) -> Result<String, AnalyzeError> {
        let key = self.api_key()?;
        let response = self
            .http
            .post(format!(
                "{}/v1/agents/completions",
                self.config.api_base_url
            ))
            .bearer_auth(key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = %status, preview = %excerpt(&text, 200), "agent completion response");

        if !status.is_success() {
            return Err(AnalyzeError::CompletionFailed {
                status: status.as_u16(),
                excerpt: excerpt(&text, self.config.detail_limit),
            });
        }

        let body: AgentCompletionResponse = serde_json::from_str(&text).map_err(|_| {
            AnalyzeError::MalformedCompletion {
                excerpt: excerpt(&text, self.config.detail_limit),
            }
        })?;

        match body.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(AnalyzeError::MalformedCompletion {
                excerpt: excerpt(&text, self.config.detail_limit),
            }),
        }
    }

    /// Delete an uploaded file. `DELETE /v1/files/{id}`.
    ///
    /// The caller treats any error from this as advisory; see
    /// [`crate::analyze`].
    pub async fn delete_file(&self, file: &UploadedFile) -> Result<(), AnalyzeError> {
        let key = self.api_key()?;
        let response = self
            .http
            .delete(format!(
                "{}/v1/files/{}",
                self.config.api_base_url, file.id
            ))
            .bearer_auth(key)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::CleanupFailed { detail });
        }
        Ok(())
    }
}

/// Truncate `s` to at most `limit` chars, respecting UTF-8 boundaries.
pub fn excerpt(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    s.chars().take(limit).collect()
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: String,
}

/// Request body for `POST /v1/agents/completions`.
#[derive(Debug, Serialize)]
pub struct AgentCompletionRequest {
    pub agent_id: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

/// One chat message; system messages carry plain text, the user message
/// carries typed content parts (text + document attachment).
#[derive(Debug, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_with_document(text: impl Into<String>, document_url: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::DocumentUrl {
                    document_url: document_url.into(),
                },
            ]),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    DocumentUrl { document_url: String },
}

#[derive(Debug, Deserialize)]
struct AgentCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
