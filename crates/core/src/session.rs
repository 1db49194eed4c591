//! Chat session state: the conversation plus per-session settings.
//!
//! A [`ChatSession`] is created when a user opens a chat and dropped when
//! they leave. It is passed by `&mut` into the orchestrator, so one session
//! can never be handling two messages at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;
use crate::message::{Conversation, ConversationId};

/// Settings key for the retrieval toggle.
pub const USE_CONTEXT_KEY: &str = "use_context";

/// Older widget id for the same toggle, still accepted.
pub const USE_CONTEXT_ALIAS: &str = "use_vectorstore";

/// Per-session toggles read by the orchestrator on every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Ground answers in the loaded document
    #[serde(default = "default_use_context")]
    pub use_context: bool,
}

fn default_use_context() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_context: default_use_context(),
        }
    }
}

/// A settings-change event, as sent by the chat surface: widget id → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsUpdate(pub serde_json::Map<String, serde_json::Value>);

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update that sets the retrieval toggle.
    pub fn use_context(enabled: bool) -> Self {
        let mut update = Self::new();
        update.0.insert(USE_CONTEXT_KEY.into(), serde_json::Value::Bool(enabled));
        update
    }

    /// Resolve the retrieval toggle. A missing key means "on".
    pub fn resolve_use_context(&self) -> std::result::Result<bool, ChannelError> {
        let value = self
            .0
            .get(USE_CONTEXT_KEY)
            .or_else(|| self.0.get(USE_CONTEXT_ALIAS));

        match value {
            None => Ok(true),
            Some(serde_json::Value::Bool(b)) => Ok(*b),
            Some(other) => Err(ChannelError::InvalidSettings(format!(
                "{USE_CONTEXT_KEY} must be a boolean, got {other}"
            ))),
        }
    }
}

/// Everything one chat session owns.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: ConversationId,
    pub conversation: Conversation,
    pub settings: Settings,
    pub started_at: DateTime<Utc>,
}

impl ChatSession {
    /// Start a session with the given initial settings.
    pub fn new(settings: Settings) -> Self {
        let id = ConversationId::new();
        Self {
            conversation: Conversation::with_id(id.clone()),
            id,
            settings,
            started_at: Utc::now(),
        }
    }

    /// Apply a settings-change event. Produces no reply.
    pub fn apply_settings(&mut self, update: &SettingsUpdate) -> std::result::Result<(), ChannelError> {
        let use_context = update.resolve_use_context()?;
        if use_context != self.settings.use_context {
            tracing::debug!(session = %self.id, use_context, "Session settings changed");
        }
        self.settings.use_context = use_context;
        Ok(())
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
