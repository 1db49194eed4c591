//! Ready-made pipelines built from the gateway, prompt chains and
//! structured completions.

pub mod note_summary;
pub mod travel_plan;

pub use note_summary::{PatientNoteSummary, summarize_note};
pub use travel_plan::{TravelPlan, TripRequest, plan_trip};
