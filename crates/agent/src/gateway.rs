//! Model gateway: one configured model behind a single request/response call.
//!
//! The gateway owns model identity and sampling settings so orchestrators
//! only decide *what* to send: history, instruction and tool declarations.
//! It never reads or writes a conversation; callers pass history in.

use std::sync::Arc;

use docent_config::AppConfig;
use docent_core::error::ProviderError;
use docent_core::message::Message;
use docent_core::provider::{ModelReply, Provider, ProviderRequest, ResponseFormat, ToolDefinition};
use tracing::debug;

#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    /// A gateway using the configured default model, temperature and token limit.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.default_model.clone())
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Send `history` behind `instruction`, declaring `tools`.
    ///
    /// Returns `None` when the model produced neither text nor tool calls.
    pub async fn complete(
        &self,
        history: &[Message],
        instruction: &str,
        tools: Vec<ToolDefinition>,
    ) -> Result<Option<ModelReply>, ProviderError> {
        let mut request = self.request(history, instruction);
        request.tools = tools;
        let message = self.send(request).await?;
        ModelReply::from_message(&message)
    }

    /// Send a single user prompt and return its text, or `None` if empty.
    pub async fn complete_prompt(
        &self,
        prompt: &str,
        instruction: &str,
    ) -> Result<Option<String>, ProviderError> {
        let request = self.request(&[Message::user(prompt)], instruction);
        let message = self.send(request).await?;
        Ok(non_empty(message.content))
    }

    /// Send a single user prompt constrained to a JSON schema.
    pub async fn complete_json(
        &self,
        prompt: &str,
        instruction: &str,
        format: ResponseFormat,
    ) -> Result<Option<String>, ProviderError> {
        let mut request = self.request(&[Message::user(prompt)], instruction);
        request.response_format = Some(format);
        let message = self.send(request).await?;
        Ok(non_empty(message.content))
    }

    fn request(&self, history: &[Message], instruction: &str) -> ProviderRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !instruction.is_empty() {
            messages.push(Message::system(instruction));
        }
        messages.extend_from_slice(history);

        let mut request = ProviderRequest::new(self.model.clone(), messages, self.temperature);
        request.max_tokens = self.max_tokens;
        request
    }

    async fn send(&self, request: ProviderRequest) -> Result<Message, ProviderError> {
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            structured = request.response_format.is_some(),
            "Calling model"
        );

        let response = self.provider.complete(request).await?;

        debug!(
            model = %response.model,
            content_len = response.message.content.len(),
            tool_calls = response.message.tool_calls.len(),
            "Model replied"
        );
        Ok(response.message)
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, make_tool_call, text_response, tool_call_response};
    use docent_core::message::Role;

    #[tokio::test]
    async fn instruction_is_prepended_as_system_message() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("4")]));
        let gateway = ModelGateway::new(provider.clone(), "gpt-test").with_temperature(0.3);

        let history = vec![Message::user("What's 2+2?")];
        let reply = gateway.complete(&history, "Be brief.", vec![]).await.unwrap();
        assert_eq!(reply, Some(ModelReply::Text("4".into())));

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "Be brief.");
        assert_eq!(request.messages[1].content, "What's 2+2?");
    }

    #[tokio::test]
    async fn tool_calls_are_classified() {
        let provider = Arc::new(ScriptedProvider::new(vec![tool_call_response(vec![
            make_tool_call("generate_patient", serde_json::json!({})),
        ])]));
        let gateway = ModelGateway::new(provider, "gpt-test");

        let reply = gateway
            .complete(&[Message::user("patient?")], "", vec![])
            .await
            .unwrap();
        let Some(ModelReply::ToolCalls(calls)) = reply else {
            panic!("expected tool calls, got {reply:?}");
        };
        assert_eq!(calls[0].name, "generate_patient");
    }

    #[tokio::test]
    async fn empty_prompt_reply_is_none() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("")]));
        let gateway = ModelGateway::new(provider, "gpt-test");
        assert_eq!(gateway.complete_prompt("hi", "x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn json_completion_sends_response_format() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("{}")]));
        let gateway = ModelGateway::new(provider.clone(), "gpt-test").with_max_tokens(256);
        let format = ResponseFormat {
            name: "empty".into(),
            description: None,
            schema: serde_json::json!({"type": "object"}),
            strict: true,
        };

        let text = gateway.complete_json("go", "sys", format).await.unwrap();
        assert_eq!(text.as_deref(), Some("{}"));

        let request = provider.last_request().unwrap();
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.response_format.unwrap().name, "empty");
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::AuthenticationFailed(
            "bad key".into(),
        )));
        let gateway = ModelGateway::new(provider, "gpt-test");
        let err = gateway.complete_prompt("hi", "").await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }
}
