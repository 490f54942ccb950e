//! # studybetter
//!
//! Summarize or explain PDF documents with Mistral agents, and export the
//! result as a paginated PDF or a Word document.
//!
//! ## Two flows, one interchange format
//!
//! ```text
//! POST /api/analyze
//!  │
//!  ├─ 1. Upload      POST /v1/files (purpose=ocr)         → file handle
//!  ├─ 2. Signed URL  GET  /v1/files/{id}/url              → retrieval link
//!  ├─ 3. Completion  POST /v1/agents/completions          → Markdown
//!  └─ 4. Cleanup     DELETE /v1/files/{id}   (best-effort, never fatal)
//!
//! Markdown ──▶ blocks ──▶ PDF  (HTML layout, page captions)
//!                     └──▶ DOCX (paragraph assembly)
//! ```
//!
//! The analysis proxy and the export pipeline share nothing but the
//! Markdown string. No state survives a request: uploaded files are
//! deleted before the response is returned, and export artifacts exist
//! only as the download body.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use studybetter::{app, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_env();
//!     let router = app(config)?;
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Library use
//!
//! The export functions are plain `(markdown, name, task) → bytes`
//! transformations usable without the server:
//!
//! ```rust
//! use studybetter::{render_docx, TaskType};
//!
//! let bytes = render_docx("# Notes\n\n- a\n- b\n", "notes.pdf", TaskType::Summarize)?;
//! assert!(bytes.starts_with(b"PK"));
//! # Ok::<(), studybetter::ExportError>(())
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod export;
pub mod mistral;
pub mod prompts;
pub mod server;
pub mod task;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, AnalysisRequest};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{AnalyzeError, ExportError};
pub use export::docx::render_docx;
pub use export::pdf::render_pdf;
pub use export::{output_file_name, ExportFormat};
pub use mistral::MistralClient;
pub use server::{app, AppState};
pub use task::TaskType;
