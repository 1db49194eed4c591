//! Session host: owns every live chat session for one assistant.
//!
//! A session is created on start, receives messages and settings updates by
//! id, and is dropped on end. Sessions never see each other's state.

use std::collections::HashMap;

use docent_core::error::ChannelError;
use docent_core::message::ConversationId;
use docent_core::session::{ChatSession, Settings, SettingsUpdate};
use tracing::{debug, info};

use crate::assistant::Assistant;
use crate::reply::Reply;

pub struct SessionHost<A: Assistant> {
    assistant: A,
    initial_settings: Settings,
    sessions: HashMap<ConversationId, ChatSession>,
}

impl<A: Assistant> SessionHost<A> {
    pub fn new(assistant: A) -> Self {
        Self {
            assistant,
            initial_settings: Settings::default(),
            sessions: HashMap::new(),
        }
    }

    /// Settings every new session starts with.
    pub fn with_initial_settings(mut self, settings: Settings) -> Self {
        self.initial_settings = settings;
        self
    }

    pub fn assistant(&self) -> &A {
        &self.assistant
    }

    /// Open a session and return its id.
    pub fn start(&mut self) -> ConversationId {
        let session = ChatSession::new(self.initial_settings.clone());
        let id = session.id.clone();
        info!(session = %id, mode = self.assistant.mode(), "Session started");
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Drop a session and its conversation. Returns whether it existed.
    pub fn end(&mut self, id: &ConversationId) -> bool {
        let existed = self.sessions.remove(id).is_some();
        if existed {
            info!(session = %id, "Session ended");
        }
        existed
    }

    /// Handle one user message. An unknown id gets the not-initialized notice.
    ///
    /// Takes `&mut self` for the whole turn, so the host serves one message at
    /// a time across all of its sessions. A front end that must answer several
    /// sessions concurrently needs one lock per session instead.
    pub async fn on_message(&mut self, id: &ConversationId, text: &str) -> docent_core::Result<Reply> {
        let session = self.sessions.get_mut(id);
        if session.is_none() {
            debug!(session = %id, "Message for unknown session");
        }
        self.assistant.handle(text, session).await
    }

    /// Apply a settings change. Returns `false` for an unknown id.
    pub fn on_settings_update(
        &mut self,
        id: &ConversationId,
        update: &SettingsUpdate,
    ) -> Result<bool, ChannelError> {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.apply_settings(update)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn session(&self, id: &ConversationId) -> Option<&ChatSession> {
        self.sessions.get(id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
