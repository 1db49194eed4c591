//! Shared test doubles for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docent_core::error::{ProviderError, RetrievalError, ToolError};
use docent_core::message::{Message, MessageToolCall};
use docent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use docent_core::retrieval::{ContextProvider, Passage};
use docent_core::tool::{Tool, ToolRegistry, ToolResult};
use docent_tools::GeneratePatientTool;

/// A provider that answers with a scripted sequence and records every request.
///
/// Panics if more calls are made than replies provided.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            replies: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    /// Replies and failures in call order.
    pub fn scripted(replies: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no reply scripted for call #{call}"))
    }
}

pub fn text_response(text: &str) -> ProviderResponse {
    response(Message::assistant(text))
}

pub fn tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = tool_calls;
    response(message)
}

/// A reply with neither text nor tool calls.
pub fn empty_response() -> ProviderResponse {
    response(Message::assistant(""))
}

fn response(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    make_tool_call_with_id(&format!("call_{name}"), name, args)
}

pub fn make_tool_call_with_id(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// A context provider returning fixed passages and counting calls.
pub struct ScriptedContext {
    passages: Vec<Passage>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedContext {
    pub fn new(contents: &[&str]) -> Self {
        Self {
            passages: contents
                .iter()
                .enumerate()
                .map(|(i, c)| Passage::new(*c, "report.txt", i))
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContextProvider for ScriptedContext {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

/// The patient tool, counting invocations.
pub struct CountingPatientTool {
    pub invocations: Arc<AtomicUsize>,
}

#[async_trait]
impl Tool for CountingPatientTool {
    fn name(&self) -> &str {
        "generate_patient"
    }

    fn description(&self) -> &str {
        "Generate a patient record for a hospital systems demonstration."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        GeneratePatientTool.parameters_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        GeneratePatientTool.execute(arguments).await
    }
}

/// A registry holding only the counting patient tool.
pub fn counting_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
    let invocations = Arc::new(AtomicUsize::new(0));
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CountingPatientTool {
        invocations: invocations.clone(),
    }));
    (registry, invocations)
}
