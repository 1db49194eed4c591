//! Document assistant: answers from retrieved passages or general knowledge.
//!
//! # Flow
//!
//! 1. Context off: ask the model with the general-knowledge instruction.
//! 2. Context on: retrieve `top_k` passages; with none, reply with a fixed
//!    notice and skip the model entirely.
//! 3. Otherwise build a question-plus-context prompt and ask the model with
//!    the context-only instruction.
//!
//! Each turn sends one prompt; earlier turns are recorded in the session but
//! not replayed to the model.

use std::sync::Arc;

use async_trait::async_trait;
use docent_config::AppConfig;
use docent_core::message::Message;
use docent_core::retrieval::{ContextProvider, Passage};
use docent_core::session::ChatSession;
use tracing::{debug, info};

use crate::assistant::Assistant;
use crate::gateway::ModelGateway;
use crate::reply::{self, Reply};

/// Instructions for the two document-mode model calls.
#[derive(Debug, Clone)]
pub struct DocumentPrompts {
    pub general_instruction: String,
    pub context_instruction: String,
}

impl From<&docent_config::PromptConfig> for DocumentPrompts {
    fn from(prompts: &docent_config::PromptConfig) -> Self {
        Self {
            general_instruction: prompts.general_instruction.clone(),
            context_instruction: prompts.context_instruction.clone(),
        }
    }
}

impl Default for DocumentPrompts {
    fn default() -> Self {
        Self::from(&docent_config::PromptConfig::default())
    }
}

pub struct DocumentAssistant {
    gateway: ModelGateway,
    context: Arc<dyn ContextProvider>,
    prompts: DocumentPrompts,
    top_k: usize,
}

impl DocumentAssistant {
    pub fn new(gateway: ModelGateway, context: Arc<dyn ContextProvider>) -> Self {
        Self {
            gateway,
            context,
            prompts: DocumentPrompts::default(),
            top_k: 4,
        }
    }

    pub fn from_config(
        gateway: ModelGateway,
        context: Arc<dyn ContextProvider>,
        config: &AppConfig,
    ) -> Self {
        Self::new(gateway, context)
            .with_prompts(DocumentPrompts::from(&config.prompts))
            .with_top_k(config.retrieval.top_k)
    }

    pub fn with_prompts(mut self, prompts: DocumentPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    async fn answer(&self, text: &str, use_context: bool) -> docent_core::Result<Reply> {
        if !use_context {
            debug!("Context disabled, answering from general knowledge");
            let answer = self
                .gateway
                .complete_prompt(text, &self.prompts.general_instruction)
                .await?;
            return Ok(answer.map_or_else(|| Reply::notice(reply::NO_ANSWER), Reply::Answer));
        }

        let passages = self.context.retrieve(text, self.top_k).await?;
        debug!(
            provider = self.context.name(),
            passages = passages.len(),
            "Retrieved context"
        );
        if passages.is_empty() {
            return Ok(Reply::notice(reply::NO_RELEVANT_CONTEXT));
        }

        let prompt = context_prompt(text, &passages);
        let answer = self
            .gateway
            .complete_prompt(&prompt, &self.prompts.context_instruction)
            .await?;
        Ok(answer.map_or_else(|| Reply::notice(reply::NO_ANSWER), Reply::Answer))
    }
}

/// The question followed by passages in retrieval order, separated by blank lines.
pub fn context_prompt(question: &str, passages: &[Passage]) -> String {
    let context = passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use only the context to answer the user's question.\n\n\
         Question: {question}\n\n\
         Context:\n{context}"
    )
}

#[async_trait]
impl Assistant for DocumentAssistant {
    fn mode(&self) -> &str {
        "document"
    }

    async fn handle(
        &self,
        text: &str,
        session: Option<&mut ChatSession>,
    ) -> docent_core::Result<Reply> {
        let Some(session) = session else {
            return Ok(Reply::notice(reply::NOT_INITIALIZED));
        };

        let use_context = session.settings.use_context;
        info!(
            session = %session.id,
            use_context,
            model = self.gateway.model(),
            "Handling document turn"
        );

        let reply = self.answer(text, use_context).await?;
        session.conversation.push(Message::user(text));
        session.conversation.push(Message::assistant(reply.to_string()));
        Ok(reply)
    }
}
