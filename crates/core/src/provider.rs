//! Provider trait: the abstraction over remote language models.
//!
//! A Provider sends a role-tagged message sequence (plus optional tool
//! declarations) to a model and returns the assistant message. It can also
//! turn texts into embedding vectors for similarity search.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, OpenRouter, Ollama, …).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;
use crate::tool::ToolCall;

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-4.1-mini")
    pub model: String,

    /// The conversation messages, instruction first
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Constrain the reply to a JSON schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ProviderRequest {
    /// A plain request with no tools and no output schema.
    pub fn new(model: impl Into<String>, messages: Vec<Message>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            max_tokens: None,
            tools: Vec::new(),
            response_format: None,
        }
    }
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A JSON-schema constraint on the model's reply (structured output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Name of the schema
    pub name: String,

    /// What the object represents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The JSON schema itself
    pub schema: serde_json::Value,

    /// Whether the provider should enforce the schema strictly
    #[serde(default)]
    pub strict: bool,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// An embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// The model to use for embeddings (e.g., "text-embedding-3-small").
    pub model: String,

    /// The texts to embed.
    pub inputs: Vec<String>,
}

/// An embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vectors, one per input text.
    pub embeddings: Vec<Vec<f32>>,

    /// Which model was used.
    pub model: String,

    /// Token usage.
    pub usage: Option<Usage>,
}

/// What the model decided to do with a turn.
///
/// Exactly one of the two: free text, or a non-empty list of tool calls.
/// A reply carrying neither has no representation here (see
/// [`ModelReply::from_message`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

impl ModelReply {
    /// Classify an assistant message.
    ///
    /// Non-empty text wins over tool calls when a model returns both.
    /// Returns `Ok(None)` when the message has neither.
    pub fn from_message(message: &Message) -> Result<Option<Self>, ProviderError> {
        if !message.content.is_empty() {
            return Ok(Some(Self::Text(message.content.clone())));
        }
        if message.tool_calls.is_empty() {
            return Ok(None);
        }

        let calls = message
            .tool_calls
            .iter()
            .map(|tc| {
                let arguments = if tc.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&tc.arguments).map_err(|e| {
                        ProviderError::InvalidResponse(format!(
                            "tool call '{}' has malformed arguments: {e}",
                            tc.name
                        ))
                    })?
                };
                Ok(ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        Ok(Some(Self::ToolCalls(calls)))
    }
}

/// The core Provider trait.
///
/// The orchestrators call `complete()` without knowing which backend
/// answers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Generate embeddings for the given texts.
    ///
    /// Default implementation returns an error indicating embeddings aren't supported.
    async fn embed(
        &self,
        _request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            format!("Provider '{}' does not support embeddings", self.name()),
        ))
    }

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
