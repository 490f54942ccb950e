//! The analysis sequence: upload → signed URL → completion → cleanup.
//!
//! Four strictly sequential upstream calls, each consuming the previous
//! step's output. There is no internal parallelism and no retry — any
//! failure is terminal for the request. The one deviation from
//! fail-and-return is cleanup: the uploaded file is deleted regardless of
//! whether the completion succeeded, and a deletion failure is logged
//! rather than propagated, because the handle expires server-side anyway
//! and the caller's result is already decided.

use crate::error::AnalyzeError;
use crate::mistral::{AgentCompletionRequest, Message, MistralClient, UploadedFile};
use crate::prompts;
use crate::task::TaskType;
use tracing::{info, warn};

/// One analysis request, as assembled from the multipart form.
///
/// Transient: constructed per HTTP request, dropped when the response is
/// produced.
#[derive(Debug)]
pub struct AnalysisRequest {
    /// Original client-side file name; forwarded to the upload and used
    /// for log context only.
    pub file_name: String,
    /// Raw PDF bytes.
    pub pdf: Vec<u8>,
    /// Free-text instructions forwarded verbatim to the agent.
    pub instructions: String,
    /// Selected task; drives agent routing and the system prompt.
    pub task: TaskType,
}

/// Run the full analysis sequence and return the generated Markdown.
///
/// # Errors
/// Any upstream failure maps to an [`AnalyzeError`] variant carrying the
/// upstream detail (see `error.rs` for the response mapping). A cleanup
/// failure is NOT an error: deletion is advisory.
pub async fn analyze(
    client: &MistralClient,
    request: AnalysisRequest,
) -> Result<String, AnalyzeError> {
    info!(
        file = %request.file_name,
        size = request.pdf.len(),
        task = %request.task,
        "processing analysis request"
    );

    // ── Step 1: Upload the document ──────────────────────────────────────
    let uploaded = client
        .upload_file(&request.file_name, request.pdf)
        .await?;

    // ── Step 2: Signed retrieval URL ─────────────────────────────────────
    let signed_url = match client.get_signed_url(&uploaded).await {
        Ok(url) => url,
        Err(e) => {
            cleanup(client, &uploaded).await;
            return Err(e);
        }
    };

    // ── Step 3: Build the completion request ─────────────────────────────
    let config = client.config();
    let agent_id = config.agent_id(request.task).to_string();
    info!(agent = %agent_id, task = %request.task, "dispatching agent completion");

    let completion = AgentCompletionRequest {
        agent_id,
        max_tokens: config.max_tokens,
        messages: vec![
            Message::system(prompts::system_prompt(request.task)),
            Message::user_with_document(
                prompts::instructions_text(&request.instructions),
                signed_url,
            ),
        ],
    };

    // ── Step 4: Completion, then cleanup regardless of outcome ───────────
    let result = client.agent_completion(&completion).await;
    cleanup(client, &uploaded).await;

    let markdown = result?;
    info!(chars = markdown.len(), "analysis complete");
    Ok(markdown)
}

/// Best-effort deletion of the uploaded file; failures are logged only.
async fn cleanup(client: &MistralClient, file: &UploadedFile) {
    if let Err(e) = client.delete_file(file).await {
        warn!(file_id = %file.id, error = %e, "failed to delete uploaded file");
    }
}
