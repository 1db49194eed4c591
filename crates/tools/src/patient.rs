//! Patient record tool: returns a fixed demonstration record.
//!
//! Stands in for a hospital system lookup so the tool-calling flow can run
//! end-to-end without access to real patient data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docent_core::error::ToolError;
use docent_core::tool::{Tool, ToolResult};

pub struct GeneratePatientTool;

/// A patient record as the tool reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub age: u32,
    pub condition: String,
    pub ward: String,
}

impl PatientRecord {
    /// The demonstration patient.
    pub fn demo() -> Self {
        Self {
            name: "John Smith".into(),
            age: 67,
            condition: "Hypertension".into(),
            ward: "Cardiology".into(),
        }
    }
}

#[async_trait]
impl Tool for GeneratePatientTool {
    fn name(&self) -> &str {
        "generate_patient"
    }

    fn description(&self) -> &str {
        "Generate a patient record for a hospital systems demonstration."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let record = PatientRecord::demo();
        let failed = |e: serde_json::Error| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        };
        let output = serde_json::to_string(&record).map_err(failed)?;
        let data = serde_json::to_value(&record).map_err(failed)?;

        tracing::debug!(patient = %record.name, "Generated patient record");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(data),
        })
    }
}
