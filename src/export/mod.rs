//! Export pipeline: Markdown → downloadable document artifact.
//!
//! Two target formats share one front half — the line-oriented interpreter
//! in [`blocks`] — and diverge in the back half:
//!
//! ```text
//! markdown ──▶ blocks ──▶ pdf   (HTML layout, paginated, per-page captions)
//!                     └──▶ docx (paragraph-by-paragraph Word assembly)
//! ```
//!
//! Both exporters are pure functions from `(markdown, file name, task)` to
//! bytes: no filesystem access, no partial output on failure. Naming is
//! shared so the two artifacts for one analysis always match except for
//! their extension.

pub mod blocks;
pub mod docx;
pub mod pdf;

use crate::task::TaskType;

/// Product name rendered into the header of every exported document.
pub const DOCUMENT_BRAND: &str = "Study Better";

/// Copyright line rendered into document footers.
pub const DOCUMENT_FOOTER: &str = "© 2025 Study Better. All rights reserved.";

/// Target format of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Paginated page-layout document.
    Pdf,
    /// Structured word-processor document.
    Docx,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// MIME type for the download response.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Build the output file name: source name (minus its `.pdf` extension)
/// plus the task suffix plus the target extension.
pub fn output_file_name(original: &str, task: TaskType, format: ExportFormat) -> String {
    let stem = original.strip_suffix(".pdf").unwrap_or(original);
    format!("{stem}{}.{}", task.file_suffix(), format.extension())
}

/// Title line rendered under the document header: "Summary of: <name>".
pub fn document_title(original: &str, task: TaskType) -> String {
    let stem = original.strip_suffix(".pdf").unwrap_or(original);
    format!("{} of: {}", task.title_label(), stem)
}

/// Today's date as rendered in document headers.
pub(crate) fn header_date() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
