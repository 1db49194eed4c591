//! Channel trait: the abstraction over chat surfaces.
//!
//! A Channel delivers user turns and settings changes to the assistant and
//! carries the single reply for each turn back to the user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;
use crate::session::SettingsUpdate;

/// A user message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Sender identifier (platform-specific user ID)
    pub sender_id: String,

    /// The text content
    pub content: String,

    /// The chat the message belongs to
    pub chat_id: String,
}

/// Something that happened on a channel.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A user turn; expects exactly one reply.
    Message(ChannelMessage),
    /// A settings change; expects no reply.
    SettingsUpdate(SettingsUpdate),
    /// The user left; the session should be discarded.
    End,
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli").
    fn name(&self) -> &str;

    /// Start listening for incoming events.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelEvent, ChannelError>>,
        ChannelError,
    >;

    /// Send a reply to a specific chat.
    async fn send(&self, chat_id: &str, content: &str) -> std::result::Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_message_creation() {
        let msg = ChannelMessage {
            sender_id: "local_user".into(),
            content: "What's 2+2?".into(),
            chat_id: "cli_session".into(),
        };
        let event = ChannelEvent::Message(msg);
        assert!(matches!(event, ChannelEvent::Message(ref m) if m.content == "What's 2+2?"));
    }
}
