//! Tool assistant: a chat that can call registered tools and summarize them.
//!
//! # Flow
//!
//! 1. Send the whole conversation plus the new user message, declaring
//!    every registered tool.
//! 2. Text reply: record it and answer directly.
//! 3. Tool calls: record the call, then one tool message per call. A tool
//!    whose name already has a result in the conversation is not run again;
//!    its earlier payload is reused under the new call id.
//! 4. Ask the model to summarize only the tool payload and answer with
//!    payload plus summary.
//!
//! A turn is recorded only once both model calls have returned. If the first
//! call, a tool execution or the summary call fails, the conversation is
//! left as it was and the next turn runs the tool again.

use std::sync::Arc;

use async_trait::async_trait;
use docent_config::AppConfig;
use docent_core::message::{Conversation, Message, MessageToolCall, Role};
use docent_core::provider::ModelReply;
use docent_core::session::ChatSession;
use docent_core::tool::{ToolCall, ToolRegistry};
use tracing::{debug, info};

use crate::assistant::Assistant;
use crate::gateway::ModelGateway;
use crate::reply::{self, Reply};

/// Instructions for the tool-aware call and the summary call.
#[derive(Debug, Clone)]
pub struct ToolPrompts {
    pub assistant_instruction: String,
    pub summary_instruction: String,
    /// Text placed before the tool payload in the summary request
    pub summary_prompt: String,
}

impl From<&docent_config::PromptConfig> for ToolPrompts {
    fn from(prompts: &docent_config::PromptConfig) -> Self {
        Self {
            assistant_instruction: prompts.assistant_instruction.clone(),
            summary_instruction: prompts.summary_instruction.clone(),
            summary_prompt: prompts.tool_summary_prompt.clone(),
        }
    }
}

impl Default for ToolPrompts {
    fn default() -> Self {
        Self::from(&docent_config::PromptConfig::default())
    }
}

pub struct ToolAssistant {
    gateway: ModelGateway,
    tools: Arc<ToolRegistry>,
    prompts: ToolPrompts,
}

impl ToolAssistant {
    pub fn new(gateway: ModelGateway, tools: Arc<ToolRegistry>) -> Self {
        Self {
            gateway,
            tools,
            prompts: ToolPrompts::default(),
        }
    }

    pub fn from_config(gateway: ModelGateway, tools: Arc<ToolRegistry>, config: &AppConfig) -> Self {
        Self::new(gateway, tools).with_prompts(ToolPrompts::from(&config.prompts))
    }

    pub fn with_prompts(mut self, prompts: ToolPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Run or reuse every requested tool. Returns the messages to record and
    /// the payloads in call order.
    async fn resolve_calls(
        &self,
        conversation: &Conversation,
        calls: &[ToolCall],
    ) -> docent_core::Result<(Vec<Message>, Vec<String>)> {
        let mut recorded: Vec<Message> = Vec::with_capacity(calls.len());
        let mut payloads = Vec::with_capacity(calls.len());

        for call in calls {
            let payload = match prior_result(conversation, &recorded, &call.name) {
                Some(previous) => {
                    debug!(tool = %call.name, call_id = %call.id, "Reusing earlier tool result");
                    previous
                }
                None => {
                    debug!(tool = %call.name, call_id = %call.id, "Executing tool");
                    self.tools.execute(call).await?.output
                }
            };
            recorded.push(Message::tool_result(&call.name, &call.id, payload.clone()));
            payloads.push(payload);
        }

        Ok((recorded, payloads))
    }
}

/// The newest payload for `tool_name`, looking at this turn's pending
/// messages before the recorded conversation.
fn prior_result(conversation: &Conversation, pending: &[Message], tool_name: &str) -> Option<String> {
    pending
        .iter()
        .rev()
        .find(|m| m.role == Role::Tool && m.tool_name.as_deref() == Some(tool_name))
        .or_else(|| conversation.latest_tool_result(tool_name))
        .map(|m| m.content.clone())
}

/// The assistant message that carried `calls`, as it goes into history.
fn tool_call_message(calls: &[ToolCall]) -> Message {
    let mut message = Message::assistant("");
    message.tool_calls = calls
        .iter()
        .map(|call| MessageToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        })
        .collect();
    message
}

#[async_trait]
impl Assistant for ToolAssistant {
    fn mode(&self) -> &str {
        "tool"
    }

    async fn handle(
        &self,
        text: &str,
        session: Option<&mut ChatSession>,
    ) -> docent_core::Result<Reply> {
        let Some(session) = session else {
            return Ok(Reply::notice(reply::NOT_INITIALIZED));
        };

        info!(
            session = %session.id,
            history = session.conversation.len(),
            model = self.gateway.model(),
            "Handling tool turn"
        );

        let user_message = Message::user(text);
        let mut history = session.conversation.messages().to_vec();
        history.push(user_message.clone());

        let outcome = self
            .gateway
            .complete(&history, &self.prompts.assistant_instruction, self.tools.definitions())
            .await?;

        let calls = match outcome {
            None => {
                session.conversation.push(user_message);
                return Ok(Reply::notice(reply::NO_RESPONSE));
            }
            Some(ModelReply::Text(answer)) => {
                session.conversation.push(user_message);
                session.conversation.push(Message::assistant(answer.clone()));
                return Ok(Reply::Model(answer));
            }
            Some(ModelReply::ToolCalls(calls)) => calls,
        };

        let (tool_messages, payloads) = self.resolve_calls(&session.conversation, &calls).await?;

        let payload = payloads.join("\n");
        let prompt = format!("{} {payload}", self.prompts.summary_prompt);
        let summary = self
            .gateway
            .complete_prompt(&prompt, &self.prompts.summary_instruction)
            .await?;

        session.conversation.push(user_message);
        session.conversation.push(tool_call_message(&calls));
        for message in tool_messages {
            session.conversation.push(message);
        }
        let summary = match summary {
            Some(summary) => {
                session.conversation.push(Message::assistant(summary.clone()));
                summary
            }
            None => reply::NO_SUMMARY.to_string(),
        };

        Ok(Reply::ToolSummary { payload, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        ScriptedProvider, counting_registry, empty_response, make_tool_call, make_tool_call_with_id,
        text_response, tool_call_response,
    };
    use docent_core::error::{ProviderError, ToolError};
    use docent_core::provider::ProviderResponse;
    use std::sync::atomic::Ordering;

    const RECORD: &str = r#"{"name":"John Smith","age":67,"condition":"Hypertension","ward":"Cardiology"}"#;

    fn assistant(provider: &Arc<ScriptedProvider>, registry: ToolRegistry) -> ToolAssistant {
        ToolAssistant::new(ModelGateway::new(provider.clone(), "gpt-test"), Arc::new(registry))
    }

    fn patient_call(id: &str) -> ProviderResponse {
        tool_call_response(vec![make_tool_call_with_id(
            id,
            "generate_patient",
            serde_json::json!({}),
        )])
    }

    #[tokio::test]
    async fn text_reply_is_prefixed_and_recorded() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("4")]));
        let (registry, invocations) = counting_registry();
        let mut session = ChatSession::default();

        let reply = assistant(&provider, registry)
            .handle("What's 2+2?", Some(&mut session))
            .await
            .unwrap();

        assert_eq!(reply.to_string(), "From Model: 4");
        assert_eq!(reply.text(), "4");
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(session.conversation.count_role(&Role::User), 1);
        assert_eq!(session.conversation.count_role(&Role::Assistant), 1);
        assert_eq!(session.conversation.len(), 2);
    }

    #[tokio::test]
    async fn tools_are_declared_and_history_is_sent() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("first"),
            text_response("second"),
        ]));
        let (registry, _) = counting_registry();
        let assistant = assistant(&provider, registry);
        let mut session = ChatSession::default();

        assistant.handle("one", Some(&mut session)).await.unwrap();
        assistant.handle("two", Some(&mut session)).await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "generate_patient");
        let contents: Vec<_> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            [ToolPrompts::default().assistant_instruction.as_str(), "one", "first", "two"]
        );
    }

    #[tokio::test]
    async fn tool_call_is_executed_and_summarized() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            patient_call("call_1"),
            text_response("S"),
        ]));
        let (registry, invocations) = counting_registry();
        let mut session = ChatSession::default();

        let reply = assistant(&provider, registry)
            .handle("Show me the patient", Some(&mut session))
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::ToolSummary {
                payload: RECORD.into(),
                summary: "S".into()
            }
        );
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        let summary_request = provider.last_request().unwrap();
        assert!(summary_request.tools.is_empty());
        assert_eq!(summary_request.messages.len(), 2);
        assert_eq!(
            summary_request.messages[1].content,
            format!("Create a simple clinical note from this information only: {RECORD}")
        );

        let roles: Vec<_> = session.conversation.messages().iter().map(|m| m.role.clone()).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::Tool, Role::Assistant]);
        let tool_message = &session.conversation.messages()[2];
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_message.tool_name.as_deref(), Some("generate_patient"));
        assert_eq!(session.conversation.messages()[1].tool_calls[0].id, "call_1");
    }

    #[tokio::test]
    async fn repeated_tool_request_reuses_result() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            patient_call("call_1"),
            text_response("S1"),
            patient_call("call_2"),
            text_response("S2"),
        ]));
        let (registry, invocations) = counting_registry();
        let assistant = assistant(&provider, registry);
        let mut session = ChatSession::default();

        let first = assistant.handle("patient?", Some(&mut session)).await.unwrap();
        let second = assistant.handle("patient again?", Some(&mut session)).await.unwrap();

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        let (Reply::ToolSummary { payload: p1, .. }, Reply::ToolSummary { payload: p2, .. }) =
            (first, second)
        else {
            panic!("expected tool summaries");
        };
        assert_eq!(p1, p2);

        let reused = session.conversation.latest_tool_result("generate_patient").unwrap();
        assert_eq!(reused.tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(session.conversation.count_role(&Role::Tool), 2);
    }

    #[tokio::test]
    async fn duplicate_calls_in_one_turn_run_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![
                make_tool_call_with_id("a", "generate_patient", serde_json::json!({})),
                make_tool_call_with_id("b", "generate_patient", serde_json::json!({})),
            ]),
            text_response("S"),
        ]));
        let (registry, invocations) = counting_registry();
        let mut session = ChatSession::default();

        let reply = assistant(&provider, registry)
            .handle("two patients", Some(&mut session))
            .await
            .unwrap();

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        let Reply::ToolSummary { payload, .. } = reply else {
            panic!("expected tool summary");
        };
        assert_eq!(payload, format!("{RECORD}\n{RECORD}"));
        assert_eq!(session.conversation.count_role(&Role::Tool), 2);
    }

    #[tokio::test]
    async fn empty_summary_falls_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            patient_call("call_1"),
            text_response(""),
        ]));
        let (registry, _) = counting_registry();
        let mut session = ChatSession::default();

        let reply = assistant(&provider, registry)
            .handle("patient?", Some(&mut session))
            .await
            .unwrap();

        assert_eq!(reply.text(), "No summary produced.");
        assert!(reply.to_string().contains("John Smith"));
    }

    #[tokio::test]
    async fn neither_text_nor_tools_is_no_response() {
        let provider = Arc::new(ScriptedProvider::new(vec![empty_response()]));
        let (registry, _) = counting_registry();
        let mut session = ChatSession::default();

        let reply = assistant(&provider, registry)
            .handle("hello", Some(&mut session))
            .await
            .unwrap();
        assert_eq!(reply.to_string(), "No response.");
    }

    #[tokio::test]
    async fn text_wins_over_tool_calls() {
        let mut both = text_response("I already know");
        both.message.tool_calls = vec![make_tool_call("generate_patient", serde_json::json!({}))];
        let provider = Arc::new(ScriptedProvider::new(vec![both]));
        let (registry, invocations) = counting_registry();
        let mut session = ChatSession::default();

        let reply = assistant(&provider, registry)
            .handle("patient?", Some(&mut session))
            .await
            .unwrap();

        assert_eq!(reply, Reply::Model("I already know".into()));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_and_records_nothing() {
        let provider = Arc::new(ScriptedProvider::new(vec![tool_call_response(vec![
            make_tool_call("drop_tables", serde_json::json!({})),
        ])]));
        let (registry, _) = counting_registry();
        let mut session = ChatSession::default();

        let err = assistant(&provider, registry)
            .handle("do it", Some(&mut session))
            .await
            .unwrap_err();

        assert!(matches!(err, docent_core::Error::Tool(ToolError::NotFound(ref name)) if name == "drop_tables"));
        assert!(session.conversation.is_empty());
    }

    #[tokio::test]
    async fn first_call_failure_records_nothing() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::Timeout("t".into())));
        let (registry, invocations) = counting_registry();
        let mut session = ChatSession::default();

        let err = assistant(&provider, registry)
            .handle("Generate a patient", Some(&mut session))
            .await
            .unwrap_err();

        assert!(matches!(err, docent_core::Error::Provider(ProviderError::Timeout(_))));
        assert!(session.conversation.is_empty());
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn summary_failure_records_nothing_and_next_turn_reruns_tool() {
        let provider = Arc::new(ScriptedProvider::scripted(vec![
            Ok(patient_call("call_1")),
            Err(ProviderError::Timeout("t".into())),
            Ok(patient_call("call_2")),
            Ok(text_response("S")),
        ]));
        let (registry, invocations) = counting_registry();
        let assistant = assistant(&provider, registry);
        let mut session = ChatSession::default();

        let err = assistant
            .handle("Generate a patient", Some(&mut session))
            .await
            .unwrap_err();
        assert!(matches!(err, docent_core::Error::Provider(ProviderError::Timeout(_))));
        assert!(session.conversation.is_empty());
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        let answer = assistant
            .handle("Generate a patient", Some(&mut session))
            .await
            .unwrap();
        assert_eq!(answer.text(), "S");
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
        assert_eq!(session.conversation.count_role(&Role::User), 1);
        assert_eq!(session.conversation.count_role(&Role::Tool), 1);
    }

    #[tokio::test]
    async fn missing_session_is_a_notice() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let (registry, _) = counting_registry();
        let answer = assistant(&provider, registry).handle("hi", None).await.unwrap();
        assert_eq!(answer, Reply::notice(reply::NOT_INITIALIZED));
        assert_eq!(provider.calls(), 0);
    }
}
