//! Chat channels for docent.
//!
//! A channel turns a chat surface into a stream of [`ChannelEvent`]s
//! (messages, settings updates, end of session) and delivers replies.
//!
//! Available channels:
//! - **CLI**: interactive terminal chat (stdin/stdout)
//!
//! [`ChannelEvent`]: docent_core::channel::ChannelEvent

pub mod cli;

pub use cli::{CliChannel, parse_line};
