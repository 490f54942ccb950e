//! Line-oriented Markdown interpreter shared by both exporters.
//!
//! A deliberately small, single-pass, non-recursive reading of Markdown:
//! fenced code blocks, three heading levels, flat bullet runs, math-marker
//! lines, paragraphs, blanks. Inline emphasis, links, tables, and nested
//! lists are NOT interpreted here — consumers decide whether to run an
//! additional inline pass (the PDF exporter does) or render them as literal
//! characters (the Word exporter does). The narrow scope is a contract, not
//! an omission; widening it changes what both exporters emit.

/// One interpreted block of the source Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#`/`##`/`###` heading; `level` is 1–3.
    Heading { level: u8, text: String },
    /// A run of consecutive `- ` lines, kept together as one block.
    Bullets(Vec<String>),
    /// Contents of one fenced code block, line by line.
    Code(Vec<String>),
    /// A line containing math markers, with `$` stripped and `\\`
    /// collapsed to `\`.
    Math(String),
    /// Any other non-blank line.
    Paragraph(String),
    /// A blank line.
    Blank,
}

/// Interpret Markdown into a flat block list.
///
/// A pending bullet run is flushed as one [`Block::Bullets`] when the run
/// ends: on a blank line, on any non-bullet line, and at end of input —
/// so `- a` / `- b` / blank yields exactly one bullet block with two items.
pub fn interpret(markdown: &str) -> Vec<Block> {
    fn flush_bullets(blocks: &mut Vec<Block>, bullets: &mut Vec<String>) {
        if !bullets.is_empty() {
            blocks.push(Block::Bullets(std::mem::take(bullets)));
        }
    }

    let mut blocks = Vec::new();
    let mut bullets: Vec<String> = Vec::new();
    let mut code: Vec<String> = Vec::new();
    let mut in_code = false;

    for line in markdown.lines() {
        if line.starts_with("```") {
            if in_code {
                blocks.push(Block::Code(std::mem::take(&mut code)));
            } else {
                flush_bullets(&mut blocks, &mut bullets);
            }
            in_code = !in_code;
            continue;
        }

        if in_code {
            code.push(line.to_string());
            continue;
        }

        if let Some(text) = line.strip_prefix("# ") {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Heading {
                level: 1,
                text: text.to_string(),
            });
        } else if let Some(text) = line.strip_prefix("## ") {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Heading {
                level: 2,
                text: text.to_string(),
            });
        } else if let Some(text) = line.strip_prefix("### ") {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Heading {
                level: 3,
                text: text.to_string(),
            });
        } else if let Some(item) = line.strip_prefix("- ") {
            bullets.push(item.to_string());
        } else if line.trim().is_empty() {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Blank);
        } else if line.contains('$') || line.contains('\\') {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Math(strip_math_markers(line)));
        } else {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Paragraph(line.to_string()));
        }
    }

    // End of input closes any open run or (unterminated) fence.
    flush_bullets(&mut blocks, &mut bullets);
    if !code.is_empty() {
        blocks.push(Block::Code(code));
    }

    blocks
}

/// Strip LaTeX notation markers: remove every `$`, collapse `\\` to `\`.
fn strip_math_markers(line: &str) -> String {
    line.replace('$', "").replace("\\\\", "\\")
}
