//! The single outbound message produced for each user turn.

use std::fmt;

pub const NOT_INITIALIZED: &str = "App not initialized, please restart.";
pub const NO_ANSWER: &str = "No answer produced.";
pub const NO_RELEVANT_CONTEXT: &str =
    "No relevant information found in the document while RAG is enabled.";
pub const NO_RESPONSE: &str = "No response.";
pub const NO_SUMMARY: &str = "No summary produced.";

/// What the assistant says back.
///
/// The variant records where the text came from; `Display` renders the
/// prefix the user sees.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A direct model answer in the tool-capable flow.
    Model(String),
    /// A document-mode answer, grounded or from general knowledge, shown verbatim.
    Answer(String),
    /// Raw tool output followed by the model's summary of it.
    ToolSummary { payload: String, summary: String },
    /// A fixed explanatory message; no model text involved.
    Notice(String),
}

impl Reply {
    pub fn notice(text: &str) -> Self {
        Self::Notice(text.to_string())
    }

    /// The model or notice text without any prefix. For a tool summary this
    /// is the summary.
    pub fn text(&self) -> &str {
        match self {
            Self::Model(text) | Self::Answer(text) | Self::Notice(text) => text,
            Self::ToolSummary { summary, .. } => summary,
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, Self::Notice(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(text) => write!(f, "From Model: {text}"),
            Self::Answer(text) | Self::Notice(text) => f.write_str(text),
            Self::ToolSummary { payload, summary } => {
                write!(f, "From Tool:\n{payload}\n\nFrom Model:\nSummary: {summary}")
            }
        }
    }
}
