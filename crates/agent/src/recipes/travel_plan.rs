//! Travel planner: brainstorm, outline, then a structured plan.
//!
//! The first two steps run as a prompt chain at falling temperatures; the
//! last turns the outline into a [`TravelPlan`] at temperature zero.

use std::collections::HashMap;

use docent_core::provider::ResponseFormat;
use serde::{Deserialize, Serialize};

use crate::chain::{ChainStep, PromptChain};
use crate::error::AgentError;
use crate::gateway::ModelGateway;
use crate::structured::{StructuredOutput, complete_structured};

const BRAINSTORM_TEMPERATURE: f32 = 0.8;
const OUTLINE_TEMPERATURE: f32 = 0.4;

const FINAL_SYSTEM: &str = "Convert the outline into a concise, structured plan.";

/// What the traveler asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub days: u32,
    pub style: String,
    #[serde(default = "default_constraints")]
    pub constraints: String,
}

fn default_constraints() -> String {
    "None".into()
}

impl TripRequest {
    fn into_inputs(self) -> HashMap<String, String> {
        HashMap::from([
            ("destination".to_string(), self.destination),
            ("days".to_string(), self.days.to_string()),
            ("style".to_string(), self.style),
            ("constraints".to_string(), self.constraints),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPlan {
    /// One to two sentence trip summary
    pub overview: String,
    /// Day-by-day plan with key stops
    pub daily_plan: Vec<String>,
    /// Bookings to make ahead of time
    pub reservations: Vec<String>,
    /// Weather- or activity-specific items
    pub packing: Vec<String>,
}

impl StructuredOutput for TravelPlan {
    fn response_format() -> ResponseFormat {
        let list = |description: &str| {
            serde_json::json!({
                "type": "array",
                "items": {"type": "string"},
                "description": description
            })
        };
        ResponseFormat {
            name: "travel_plan".into(),
            description: Some("A structured multi-day travel plan".into()),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "overview": {
                        "type": "string",
                        "description": "One to two sentence trip summary"
                    },
                    "daily_plan": list("Day-by-day plan with key stops"),
                    "reservations": list("Bookings to make ahead of time"),
                    "packing": list("Weather- or activity-specific items")
                },
                "required": ["overview", "daily_plan", "reservations", "packing"]
            }),
            strict: true,
        }
    }
}

/// The brainstorm and outline steps.
pub fn planning_chain(gateway: &ModelGateway) -> PromptChain {
    PromptChain::new(gateway.clone())
        .step(
            ChainStep::new(
                "draft_plan",
                "You are a lively travel designer who brainstorms concise trip ideas.",
                "Destination: {{destination}}\n\
                 Days: {{days}}\n\
                 Travel style: {{style}}\n\
                 Constraints: {{constraints}}\n\
                 List three trip themes with a one-line rationale each.",
            )
            .temperature(BRAINSTORM_TEMPERATURE),
        )
        .step(
            ChainStep::new(
                "outline",
                "Turn the brainstorm into a realistic day-by-day outline.",
                "Traveler profile: {{style}}\n\
                 Draft ideas:\n{{draft_plan}}\n\
                 Create a numbered outline for each day with 2-3 anchor stops.",
            )
            .temperature(OUTLINE_TEMPERATURE),
        )
}

/// Plan a trip end to end.
pub async fn plan_trip(gateway: &ModelGateway, request: TripRequest) -> Result<TravelPlan, AgentError> {
    tracing::info!(destination = %request.destination, days = request.days, "Planning trip");

    let outputs = planning_chain(gateway).run(request.into_inputs()).await?;
    let outline = outputs
        .get("outline")
        .ok_or_else(|| AgentError::EmptyStep("outline".into()))?;

    let prompt = format!(
        "Outline:\n{outline}\n\
         Return fields: overview (1-2 sentences), daily_plan (list), \
         reservations (list of must-book items), packing (list)."
    );
    let final_gateway = gateway.clone().with_temperature(0.0);
    complete_structured(&final_gateway, FINAL_SYSTEM, &prompt).await
}
