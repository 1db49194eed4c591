//! Patient note summary: a synopsis plus the problems a note mentions.

use docent_core::provider::ResponseFormat;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::gateway::ModelGateway;
use crate::structured::{StructuredOutput, complete_structured};

const SYSTEM: &str = "You are a clinician who writes concise, neutral patient note summaries.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientNoteSummary {
    /// Clinical synopsis of the note
    pub summary: String,
    /// Key problems or concerns mentioned
    pub problems: Vec<String>,
}

impl StructuredOutput for PatientNoteSummary {
    fn response_format() -> ResponseFormat {
        ResponseFormat {
            name: "patient_note_summary".into(),
            description: Some("Summary of a patient note with its key problems".into()),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "Clinical synopsis of the patient note"
                    },
                    "problems": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Key problems or concerns mentioned"
                    }
                },
                "required": ["summary", "problems"]
            }),
            strict: true,
        }
    }
}

/// Summarize a free-text patient note.
pub async fn summarize_note(gateway: &ModelGateway, note: &str) -> Result<PatientNoteSummary, AgentError> {
    let prompt = format!(
        "Summarize the patient note and list the key problems/concerns.\n\nNote:\n{note}"
    );
    complete_structured(gateway, SYSTEM, &prompt).await
}
