//! Word-processor export: blocks → `.docx` bytes.
//!
//! A best-effort, paragraph-by-paragraph rendition of the interpreted
//! blocks. The scope boundary is deliberate: inline emphasis, links,
//! tables, and nested lists render as literal characters, and math lines
//! become italic plain text — richer Markdown fidelity is explicitly not a
//! goal of this exporter.
//!
//! One bullet run becomes exactly ONE bulleted paragraph, its items
//! separated by soft line breaks, mirroring how the rest of the product
//! groups a list into a single block.

use crate::error::ExportError;
use crate::export::blocks::{self, Block};
use crate::export::{document_title, header_date, DOCUMENT_BRAND};
use crate::task::TaskType;
use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Run, RunFonts, Start, Style, StyleType,
};
use std::io::Cursor;

/// Numbering id of the single bullet list definition.
const BULLET_NUMBERING: usize = 1;

/// Render Markdown into `.docx` bytes.
///
/// Fails atomically: a packing error returns [`ExportError::Docx`] and no
/// bytes.
pub fn render_docx(
    markdown: &str,
    file_name: &str,
    task: TaskType,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Docx::new()
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(28)
                .bold(),
        )
        .add_style(
            Style::new("Heading3", StyleType::Paragraph)
                .name("Heading 3")
                .size(24)
                .bold(),
        )
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING));

    for paragraph in front_matter(file_name, task) {
        doc = doc.add_paragraph(paragraph);
    }
    for paragraph in body_paragraphs(markdown) {
        doc = doc.add_paragraph(paragraph);
    }
    for paragraph in math_note() {
        doc = doc.add_paragraph(paragraph);
    }

    let mut cursor = Cursor::new(Vec::new());
    doc.build()
        .pack(&mut cursor)
        .map_err(|e| ExportError::Docx {
            detail: e.to_string(),
        })?;
    Ok(cursor.into_inner())
}

/// Header paragraphs: brand heading, date line, task title.
fn front_matter(file_name: &str, task: TaskType) -> Vec<Paragraph> {
    vec![
        Paragraph::new()
            .add_run(Run::new().add_text(DOCUMENT_BRAND))
            .style("Heading1"),
        Paragraph::new()
            .add_run(Run::new().add_text(header_date()))
            .align(AlignmentType::Right),
        Paragraph::new()
            .add_run(Run::new().add_text(document_title(file_name, task)))
            .style("Heading2"),
    ]
}

/// Render the interpreted blocks as Word paragraphs.
fn body_paragraphs(markdown: &str) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();

    for block in blocks::interpret(markdown) {
        match block {
            Block::Heading { level, text } => {
                let style = match level {
                    1 => "Heading1",
                    2 => "Heading2",
                    _ => "Heading3",
                };
                paragraphs.push(
                    Paragraph::new()
                        .add_run(Run::new().add_text(text))
                        .style(style),
                );
            }
            Block::Bullets(items) => {
                let mut run = Run::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        run = run.add_break(BreakType::TextWrapping);
                    }
                    run = run.add_text(item.as_str());
                }
                paragraphs.push(
                    Paragraph::new()
                        .add_run(run)
                        .numbering(NumberingId::new(BULLET_NUMBERING), IndentLevel::new(0)),
                );
            }
            Block::Code(lines) => {
                for line in lines {
                    paragraphs.push(
                        Paragraph::new().add_run(
                            Run::new()
                                .add_text(line)
                                .fonts(RunFonts::new().ascii("Courier New"))
                                .size(18),
                        ),
                    );
                }
            }
            Block::Math(text) => {
                paragraphs.push(
                    Paragraph::new().add_run(Run::new().add_text(text).italic()),
                );
            }
            Block::Paragraph(text) => {
                paragraphs.push(Paragraph::new().add_run(Run::new().add_text(text)));
            }
            Block::Blank => {
                paragraphs.push(Paragraph::new());
            }
        }
    }

    paragraphs
}

/// Closing note pointing readers at the Markdown original for math.
fn math_note() -> Vec<Paragraph> {
    vec![
        Paragraph::new(),
        Paragraph::new()
            .add_run(Run::new().add_text("Note About Mathematical Expressions"))
            .style("Heading2"),
        Paragraph::new().add_run(Run::new().add_text(
            "This document may contain mathematical expressions that were originally \
             formatted using LaTeX notation. For the best viewing experience of these \
             expressions, please refer to the original markdown file.",
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::BuildXML;

    fn xml_of(paragraphs: &[Paragraph]) -> String {
        paragraphs
            .iter()
            .map(|p| String::from_utf8(p.build()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn render_produces_zip_container() {
        let bytes = render_docx("# Hi\n\nbody", "t.pdf", TaskType::Summarize)
            .expect("render should succeed");
        // DOCX is a ZIP archive; the container starts with the PK signature.
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn bullet_run_becomes_single_bulleted_paragraph() {
        let paragraphs = body_paragraphs("- item1\n- item2\n\n");
        // One bulleted paragraph plus the trailing blank.
        assert_eq!(paragraphs.len(), 2);
        let xml = xml_of(&paragraphs[..1]);
        assert!(xml.contains("item1"));
        assert!(xml.contains("item2"));
        assert!(xml.contains("numPr"), "first paragraph should be bulleted");
    }

    #[test]
    fn math_line_is_italic_with_markers_stripped() {
        let paragraphs = body_paragraphs("$x^2$");
        assert_eq!(paragraphs.len(), 1);
        let xml = xml_of(&paragraphs);
        assert!(xml.contains("x^2"));
        assert!(!xml.contains('$'));
        assert!(xml.contains("<w:i"), "math paragraph should be italic");
    }

    #[test]
    fn code_lines_are_monospace_paragraphs() {
        let paragraphs = body_paragraphs("```\nlet x = 1;\n```");
        assert_eq!(paragraphs.len(), 1);
        let xml = xml_of(&paragraphs);
        assert!(xml.contains("Courier New"));
        assert!(xml.contains("let x = 1;"));
    }

    #[test]
    fn inline_emphasis_stays_literal() {
        let paragraphs = body_paragraphs("some **bold** text");
        let xml = xml_of(&paragraphs);
        assert!(xml.contains("some **bold** text"));
    }

    #[test]
    fn front_matter_carries_title() {
        let xml = xml_of(&front_matter("paper.pdf", TaskType::Explain));
        assert!(xml.contains("Study Better"));
        assert!(xml.contains("Explanation of: paper"));
    }
}
