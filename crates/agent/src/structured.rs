//! Structured completions: model output parsed straight into a Rust type.
//!
//! The request carries a JSON schema as the response format; the reply is
//! deserialized with serde. Providers that ignore the format sometimes wrap
//! the object in a fenced code block, which is stripped before parsing.

use docent_core::provider::ResponseFormat;
use serde::de::DeserializeOwned;

use crate::error::AgentError;
use crate::gateway::ModelGateway;

/// A type the model can be asked to produce directly.
pub trait StructuredOutput: DeserializeOwned {
    /// The schema sent with the request.
    fn response_format() -> ResponseFormat;
}

/// Ask for a `T` and parse the reply.
pub async fn complete_structured<T: StructuredOutput>(
    gateway: &ModelGateway,
    system: &str,
    prompt: &str,
) -> Result<T, AgentError> {
    let format = T::response_format();
    let name = format.name.clone();
    let text = gateway
        .complete_json(prompt, system, format)
        .await?
        .ok_or(AgentError::EmptyOutput)?;

    tracing::debug!(schema = %name, len = text.len(), "Parsing structured output");
    parse_json(&text)
}

/// Parse a JSON reply, tolerating a surrounding ```json fence.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, AgentError> {
    serde_json::from_str(strip_fence(text)).map_err(|e| AgentError::InvalidOutput(e.to_string()))
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
