//! # docent core
//!
//! Domain types, traits, and error definitions for the docent chat
//! assistants. This crate has **no framework dependencies**: it defines the
//! model every other crate implements against.
//!
//! ## Seams
//!
//! Every external collaborator is a trait here:
//! - [`Provider`]: a remote language model (chat completions, embeddings)
//! - [`ContextProvider`]: ranked passages for a query
//! - [`Tool`]: a named action the model may ask for
//! - [`Channel`]: the chat surface that delivers user turns
//!
//! Implementations live in their own crates, so the orchestrators can be
//! driven by scripted stand-ins in tests.

pub mod error;
pub mod message;
pub mod provider;
pub mod channel;
pub mod tool;
pub mod retrieval;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Conversation, ConversationId};
pub use provider::{ModelReply, Provider, ProviderRequest, ProviderResponse};
pub use channel::{Channel, ChannelEvent, ChannelMessage};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use retrieval::{ContextProvider, Passage};
pub use session::{ChatSession, Settings, SettingsUpdate};
