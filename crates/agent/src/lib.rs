//! Chat orchestration for docent.
//!
//! Two assistants share one shape: a user message comes in with its
//! session, at most two model calls and any tool runs happen in order, and
//! exactly one [`Reply`] goes out.
//!
//! - [`DocumentAssistant`] answers from retrieved document passages, or from
//!   general knowledge when the session has context turned off.
//! - [`ToolAssistant`] lets the model call registered tools, reuses earlier
//!   tool results from the conversation, and summarizes the tool output.
//!
//! [`SessionHost`] owns the sessions; [`PromptChain`] and
//! [`complete_structured`] back the one-shot recipes.

pub mod assistant;
pub mod chain;
pub mod document;
pub mod error;
pub mod gateway;
pub mod recipes;
pub mod reply;
pub mod sessions;
pub mod structured;
pub mod tool_chat;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assistant::Assistant;
pub use chain::{ChainStep, PromptChain};
pub use document::{DocumentAssistant, DocumentPrompts};
pub use error::AgentError;
pub use gateway::ModelGateway;
pub use recipes::{PatientNoteSummary, TravelPlan, TripRequest, plan_trip, summarize_note};
pub use reply::Reply;
pub use sessions::SessionHost;
pub use structured::{StructuredOutput, complete_structured};
pub use tool_chat::{ToolAssistant, ToolPrompts};
