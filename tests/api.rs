//! Endpoint tests for the analysis proxy and export downloads.
//!
//! The Mistral upstream is a wiremock server; the config's `api_base_url`
//! points the client at it, so every test exercises the real router,
//! multipart parsing, and the full four-step call sequence without network
//! access.

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::json;
use studybetter::{app, ServiceConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────

fn server_with(config: ServiceConfig) -> TestServer {
    TestServer::new(app(config).expect("router should build")).expect("test server")
}

fn config_against(upstream: &MockServer) -> ServiceConfig {
    ServiceConfig::builder()
        .api_key("test-key-123")
        .api_base_url(upstream.uri())
        .summary_agent_id("agent-sum")
        .explain_agent_id("agent-exp")
        .build()
        .expect("config should build")
}

fn pdf_part() -> Part {
    Part::bytes(b"%PDF-1.4 fake body".to_vec())
        .file_name("lecture.pdf")
        .mime_type("application/pdf")
}

fn full_form() -> MultipartForm {
    MultipartForm::new()
        .add_part("pdf", pdf_part())
        .add_text("instructions", "focus on the conclusion")
        .add_text("taskType", "summarize")
}

/// Stub the three file endpoints (upload, signed URL, delete); each test
/// mounts its own completion stub. wiremock serves the first matching
/// mock, so the completion behaviour must not be pre-mounted.
async fn mount_file_endpoints(upstream: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-123",
            "object": "file",
            "purpose": "ocr"
        })))
        .mount(upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/files/file-123/url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://signed.example/file-123"
        })))
        .mount(upstream)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/files/file-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .mount(upstream)
        .await;
}

async fn mount_completion(upstream: &MockServer, markdown: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": markdown}}]
        })))
        .mount(upstream)
        .await;
}

// ── Validation (no upstream contact) ─────────────────────────────────────

#[tokio::test]
async fn missing_pdf_yields_400_naming_the_field() {
    let server = server_with(ServiceConfig::default());
    let form = MultipartForm::new()
        .add_text("instructions", "summarize")
        .add_text("taskType", "summarize");

    let response = server.post("/api/analyze").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "PDF file is required");
}

#[tokio::test]
async fn missing_instructions_yields_400_naming_the_field() {
    let server = server_with(ServiceConfig::default());
    let form = MultipartForm::new()
        .add_part("pdf", pdf_part())
        .add_text("taskType", "summarize");

    let response = server.post("/api/analyze").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Instructions are required");
}

#[tokio::test]
async fn missing_task_type_yields_400_naming_the_field() {
    let server = server_with(ServiceConfig::default());
    let form = MultipartForm::new()
        .add_part("pdf", pdf_part())
        .add_text("instructions", "summarize");

    let response = server.post("/api/analyze").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Task type is required");
}

#[tokio::test]
async fn unknown_task_type_yields_400() {
    let server = server_with(ServiceConfig::default());
    let form = MultipartForm::new()
        .add_part("pdf", pdf_part())
        .add_text("instructions", "do something")
        .add_text("taskType", "translate");

    let response = server.post("/api/analyze").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("'summarize' or 'explain'"));
}

#[tokio::test]
async fn missing_credential_yields_500() {
    // Default config has no api key; fields are all present.
    let server = server_with(ServiceConfig::default());

    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Mistral API key is not configured");
}

#[tokio::test]
async fn get_yields_405_with_advisory_message() {
    let server = server_with(ServiceConfig::default());

    let response = server.get("/api/analyze").await;
    assert_eq!(response.status_code(), 405);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["message"],
        "This endpoint requires a POST request with PDF data"
    );
}

// ── Full sequence against the stubbed upstream ───────────────────────────

#[tokio::test]
async fn success_returns_extracted_markdown() {
    let upstream = MockServer::start().await;
    mount_file_endpoints(&upstream).await;
    mount_completion(&upstream, "# Summary\n\n- point one\n").await;
    let server = server_with(config_against(&upstream));

    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["markdown"], "# Summary\n\n- point one\n");
}

#[tokio::test]
async fn summarize_routes_to_the_summary_agent() {
    let upstream = MockServer::start().await;
    mount_file_endpoints(&upstream).await;

    // Only a completion for the summary agent carrying the signed URL and
    // the prefixed instructions will match; anything else 404s the test.
    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .and(body_partial_json(json!({
            "agent_id": "agent-sum",
            "max_tokens": 4000,
            "messages": [
                {"role": "system"},
                {"role": "user", "content": [
                    {"type": "text", "text": "Here are my instructions: focus on the conclusion"},
                    {"type": "document_url", "document_url": "https://signed.example/file-123"}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "routed"}}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["markdown"], "routed");
}

#[tokio::test]
async fn upload_failure_yields_500_with_upstream_detail() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upload exploded"))
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to upload PDF file"));
    assert!(body["error"].as_str().unwrap().contains("upload exploded"));
}

#[tokio::test]
async fn signed_url_failure_yields_500_with_upstream_detail() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "file-123"})))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/files/file-123/url"))
        .respond_with(ResponseTemplate::new(503).set_body_string("no url for you"))
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to get signed URL"));
    assert!(body["error"].as_str().unwrap().contains("no url for you"));
}

#[tokio::test]
async fn completion_failure_yields_500_with_excerpt_details() {
    let upstream = MockServer::start().await;
    mount_file_endpoints(&upstream).await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway from agents"))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Failed to process request: HTTP error 502");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("bad gateway from agents"));
}

#[tokio::test]
async fn completion_detail_is_truncated_to_the_limit() {
    let upstream = MockServer::start().await;
    mount_file_endpoints(&upstream).await;
    let long_body = "x".repeat(2000);
    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string(long_body))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["details"].as_str().unwrap().len(), 500);
}

#[tokio::test]
async fn unparsable_completion_body_yields_500_with_raw_excerpt() {
    let upstream = MockServer::start().await;
    mount_file_endpoints(&upstream).await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>definitely not json"))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Failed to parse response from agent API");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("<html>definitely not json"));
}

#[tokio::test]
async fn empty_choices_is_a_malformed_completion() {
    let upstream = MockServer::start().await;
    mount_file_endpoints(&upstream).await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Failed to parse response from agent API");
}

#[tokio::test]
async fn cleanup_failure_does_not_change_success() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "file-123"})))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/files/file-123/url"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://signed.example/file-123"})),
        )
        .mount(&upstream)
        .await;
    mount_completion(&upstream, "still fine").await;
    // Deletion blows up; the response must not care.
    Mock::given(method("DELETE"))
        .and(path("/v1/files/file-123"))
        .respond_with(ResponseTemplate::new(500).set_body_string("delete failed"))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_with(config_against(&upstream));
    let response = server.post("/api/analyze").multipart(full_form()).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["markdown"], "still fine");
}

// ── Export downloads ─────────────────────────────────────────────────────

#[tokio::test]
async fn docx_export_downloads_named_attachment() {
    let server = server_with(ServiceConfig::default());

    let response = server
        .post("/api/export/docx")
        .json(&json!({
            "markdown": "# Notes\n\n- a\n- b\n",
            "fileName": "lecture.pdf",
            "taskType": "summarize"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let disposition = response
        .headers()
        .get("content-disposition")
        .expect("disposition header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("lecture_summarized.docx"));
    assert!(response.as_bytes().starts_with(b"PK"));
}

#[tokio::test]
async fn pdf_export_downloads_named_attachment() {
    let server = server_with(ServiceConfig::default());

    let response = server
        .post("/api/export/pdf")
        .json(&json!({
            "markdown": "# Notes\n\nSome body text with $x^2$ math.\n",
            "fileName": "lecture.pdf",
            "taskType": "explain"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let disposition = response
        .headers()
        .get("content-disposition")
        .expect("disposition header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("lecture_explained.pdf"));
    assert!(response.as_bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn health_reports_ok() {
    let server = server_with(ServiceConfig::default());
    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}
