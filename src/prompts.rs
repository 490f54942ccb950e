//! System prompts for the agent completion.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the wording the agents are primed with
//!    lives in exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt without
//!    touching the network.
//!
//! The prompt asks for Markdown with LaTeX math delimiters because the
//! export pipeline downstream recognises `$…$` / `$$…$$` markers.

use crate::task::TaskType;

/// Build the system prompt for the given task type.
///
/// The task verb is the only part that varies; everything else is fixed so
/// the two agents receive structurally identical instructions.
pub fn system_prompt(task: TaskType) -> String {
    format!(
        "You are an expert at analyzing PDF documents. \n\
Your task is to {} the content of the PDF according to your system prompt.\n\
Format your response in Markdown, including proper headings, lists, and emphasis.\n\
If the content contains mathematical expressions, format them using LaTeX notation \
with $ for inline math and $$ for block math.\n\
Be thorough and accurate in your analysis.",
        task.prompt_verb()
    )
}

/// Build the leading text part of the user message.
pub fn instructions_text(instructions: &str) -> String {
    format!("Here are my instructions: {instructions}")
}
