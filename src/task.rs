//! The user-selected task: summarize or explain.
//!
//! Task type drives three things — the agent the completion is routed to,
//! the system prompt wording, and the suffix of every exported file name.
//! Keeping the mapping on one enum means those three can never disagree.

use crate::error::AnalyzeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the caller wants done with the uploaded document.
///
/// The agent mapping is a fixed two-entry table; additional task types are
/// intentionally not assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Condense the document into its key points.
    Summarize,
    /// Walk through the document's content in detail.
    Explain,
}

impl TaskType {
    /// The suffix appended to exported file names.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            TaskType::Summarize => "_summarized",
            TaskType::Explain => "_explained",
        }
    }

    /// The label used in exported document titles ("Summary of: …").
    pub fn title_label(&self) -> &'static str {
        match self {
            TaskType::Summarize => "Summary",
            TaskType::Explain => "Explanation",
        }
    }

    /// The verb phrase spliced into the completion system prompt.
    pub fn prompt_verb(&self) -> &'static str {
        match self {
            TaskType::Summarize => "summarize",
            TaskType::Explain => "explain in detail",
        }
    }

    /// Wire name, as accepted in the `taskType` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Summarize => "summarize",
            TaskType::Explain => "explain",
        }
    }
}

impl FromStr for TaskType {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summarize" => Ok(TaskType::Summarize),
            "explain" => Ok(TaskType::Explain),
            other => Err(AnalyzeError::InvalidTaskType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
