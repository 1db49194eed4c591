//! Errors from multi-step and structured completions.

use docent_core::error::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Chain step '{0}' produced no output")]
    EmptyStep(String),

    #[error("Chain step '{step}' references unknown variable '{name}'")]
    MissingVariable { step: String, name: String },

    #[error("Model returned no structured output")]
    EmptyOutput,

    #[error("Structured output did not match the expected shape: {0}")]
    InvalidOutput(String),
}

impl From<AgentError> for docent_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Provider(e) => docent_core::Error::Provider(e),
            other => docent_core::Error::Internal(other.to_string()),
        }
    }
}
