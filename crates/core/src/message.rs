//! Message and Conversation domain types.
//!
//! A [`Conversation`] is the per-session, append-only log of everything
//! exchanged with the model: user turns, assistant answers (possibly
//! carrying tool calls), and tool results. Arrival order is the only
//! ordering guarantee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The model
    Assistant,
    /// Instructions sent ahead of the history
    System,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content (the payload, for tool messages)
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// For tool results: the tool that produced it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// For tool results: which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_name: None,
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into())
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into())
    }

    /// Create a tool result message answering `tool_call_id`.
    pub fn tool_result(
        tool_name: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut msg = Self::with_role(Role::Tool, content.into());
        msg.tool_name = Some(tool_name.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }
}

/// A tool call embedded in an assistant message, as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// The conversation state of one chat session.
///
/// Messages can only be appended; there is no way to edit or remove one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::with_id(ConversationId::new())
    }

    /// Create a new empty conversation with a known ID.
    pub fn with_id(id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent tool result recorded for `tool_name`, if any.
    pub fn latest_tool_result(&self, tool_name: &str) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Tool && m.tool_name.as_deref() == Some(tool_name))
    }

    /// Number of messages with the given role.
    pub fn count_role(&self, role: &Role) -> usize {
        self.messages.iter().filter(|m| &m.role == role).count()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("What's 2+2?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "What's 2+2?");
        assert!(msg.tool_calls.is_empty());
        assert!(msg.tool_name.is_none());
    }

    #[test]
    fn tool_result_records_name_and_call_id() {
        let msg = Message::tool_result("generate_patient", "call_1", "{}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_name.as_deref(), Some("generate_patient"));
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn conversation_tracks_updates() {
        let mut conv = Conversation::new();
        let created = conv.created_at;

        conv.push(Message::user("First message"));
        assert_eq!(conv.len(), 1);
        assert!(conv.updated_at >= created);
    }

    #[test]
    fn conversation_preserves_arrival_order() {
        let mut conv = Conversation::new();
        conv.push(Message::user("one"));
        conv.push(Message::assistant("two"));
        conv.push(Message::user("three"));

        let contents: Vec<_> = conv.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["one", "two", "three"]);
    }

    #[test]
    fn latest_tool_result_prefers_newest() {
        let mut conv = Conversation::new();
        conv.push(Message::tool_result("generate_patient", "call_1", "old"));
        conv.push(Message::tool_result("other_tool", "call_2", "unrelated"));
        conv.push(Message::tool_result("generate_patient", "call_3", "new"));

        let found = conv.latest_tool_result("generate_patient").unwrap();
        assert_eq!(found.content, "new");
        assert!(conv.latest_tool_result("missing").is_none());
    }

    #[test]
    fn latest_tool_result_ignores_non_tool_messages() {
        let mut conv = Conversation::new();
        conv.push(Message::assistant("generate_patient"));
        assert!(conv.latest_tool_result("generate_patient").is_none());
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::tool_result("generate_patient", "call_9", r#"{"age":67}"#);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Tool);
        assert_eq!(back.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(back.content, r#"{"age":67}"#);
    }
}
