//! Page-layout PDF export: blocks → styled HTML → paginated document.
//!
//! The HTML renderer inside `printpdf` does the heavy lifting: it lays the
//! content out on A4 pages and paginates wherever the text overflows. After
//! layout, a caption run is appended to every page — a right-aligned
//! sequential page number and the centered copyright line — using the
//! built-in Helvetica font so no font embedding is needed for the chrome.
//!
//! Layout here is synchronous and deterministic; there is no typesetting to
//! wait on and therefore no synchronization delay anywhere in the export.
//!
//! Math spans (`$…$`, `$$…$$`) render as italic text with the delimiters
//! stripped — styled, not typeset.

use crate::error::ExportError;
use crate::export::blocks::{self, Block};
use crate::export::{document_title, header_date, DOCUMENT_BRAND, DOCUMENT_FOOTER};
use crate::task::TaskType;
use once_cell::sync::Lazy;
use printpdf::{
    BuiltinFont, GeneratePdfOptions, Mm, Op, PdfDocument, PdfSaveOptions, Point, Pt, TextItem,
};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Render Markdown into a finished, captioned PDF.
///
/// Fails atomically: any layout or serialisation error returns
/// [`ExportError::Pdf`] and no bytes.
pub fn render_pdf(
    markdown: &str,
    file_name: &str,
    task: TaskType,
) -> Result<Vec<u8>, ExportError> {
    let html = build_html(markdown, file_name, task);

    let mut warnings = Vec::new();
    let mut doc = PdfDocument::from_html(
        &html,
        &BTreeMap::new(), // images
        &BTreeMap::new(), // fonts
        &GeneratePdfOptions::default(),
        &mut warnings,
    )
    .map_err(|e| ExportError::Pdf {
        detail: e.to_string(),
    })?;

    if !warnings.is_empty() {
        debug!(count = warnings.len(), "layout produced warnings");
    }

    let total = doc.pages.len();
    for (i, page) in doc.pages.iter_mut().enumerate() {
        page.ops.extend(caption_ops(i + 1));
    }
    debug!(pages = total, "captioned pages");

    let mut save_warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut save_warnings);
    if !save_warnings.is_empty() {
        debug!(count = save_warnings.len(), "serialisation produced warnings");
    }
    Ok(bytes)
}

/// Assemble the complete HTML document fed to the layout engine.
///
/// Kept to a small tag set (`h1`–`h4`, `p`, `strong`, `em`) that the
/// renderer is known to handle; bullets become bullet-prefixed paragraphs
/// and code lines monospace-classed paragraphs.
fn build_html(markdown: &str, file_name: &str, task: TaskType) -> String {
    let mut html = String::with_capacity(markdown.len() * 2 + 1024);
    html.push_str(
        "<html><head><style>\
         body { font-family: sans-serif; font-size: 12px; color: #000000; padding: 24px; }\
         h1 { font-size: 22px; } h2 { font-size: 18px; } h3 { font-size: 15px; } h4 { font-size: 13px; }\
         p { margin: 6px 0px; } .code { font-family: monospace; } .date { font-size: 10px; }\
         </style></head><body>",
    );

    // Document header: brand, date, task title.
    html.push_str(&format!("<h1>{}</h1>", escape(DOCUMENT_BRAND)));
    html.push_str(&format!("<p class=\"date\">{}</p>", escape(&header_date())));
    html.push_str(&format!(
        "<h2>{}</h2>",
        escape(&document_title(file_name, task))
    ));

    for block in blocks::interpret(markdown) {
        match block {
            Block::Heading { level, text } => {
                // Content headings sit under the h1/h2 document header.
                let tag = match level {
                    1 => "h2",
                    2 => "h3",
                    _ => "h4",
                };
                html.push_str(&format!("<{tag}>{}</{tag}>", inline_spans(&escape(&text))));
            }
            Block::Bullets(items) => {
                for item in items {
                    html.push_str(&format!(
                        "<p>\u{2022} {}</p>",
                        inline_spans(&escape(&item))
                    ));
                }
            }
            Block::Code(lines) => {
                for line in lines {
                    html.push_str(&format!("<p class=\"code\">{}</p>", escape(&line)));
                }
            }
            Block::Math(text) => {
                html.push_str(&format!("<p><em>{}</em></p>", escape(&text)));
            }
            Block::Paragraph(text) => {
                html.push_str(&format!("<p>{}</p>", inline_spans(&escape(&text))));
            }
            Block::Blank => {}
        }
    }

    html.push_str(&format!("<p class=\"date\">{}</p>", escape(DOCUMENT_FOOTER)));
    html.push_str("</body></html>");
    html
}

// ── Inline spans ─────────────────────────────────────────────────────────
//
// The block interpreter leaves inline markers literal; the PDF rendering
// pass upgrades the common ones to HTML spans. Rules run in a fixed order:
// display math before inline math (so `$$…$$` is not half-eaten), bold
// before italic (so `**…**` is not read as two italics).

static RE_MATH_DISPLAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$([^$]+)\$\$").unwrap());
static RE_MATH_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^$]+)\$").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

/// Convert inline Markdown emphasis and math markers to HTML spans.
///
/// Input must already be HTML-escaped.
fn inline_spans(escaped: &str) -> String {
    let s = RE_MATH_DISPLAY.replace_all(escaped, "<em>$1</em>");
    let s = RE_MATH_INLINE.replace_all(&s, "<em>$1</em>");
    let s = RE_BOLD.replace_all(&s, "<strong>$1</strong>");
    RE_ITALIC.replace_all(&s, "<em>$1</em>").into_owned()
}

/// Minimal HTML escaping for text content.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The caption run appended to each laid-out page: sequential page number
/// bottom-right, copyright line bottom-center.
fn caption_ops(page_num: usize) -> Vec<Op> {
    vec![
        Op::StartTextSection,
        Op::SetFontSizeBuiltinFont {
            size: Pt(10.0),
            font: BuiltinFont::Helvetica,
        },
        Op::SetTextCursor {
            pos: Point {
                x: Mm(180.0).into_pt(),
                y: Mm(12.0).into_pt(),
            },
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(format!("Page {page_num}"))],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
        Op::StartTextSection,
        Op::SetFontSizeBuiltinFont {
            size: Pt(8.0),
            font: BuiltinFont::Helvetica,
        },
        Op::SetTextCursor {
            pos: Point {
                x: Mm(62.0).into_pt(),
                y: Mm(6.0).into_pt(),
            },
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(DOCUMENT_FOOTER.to_string())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
    ]
}
