//! CLI channel: interactive terminal chat.
//!
//! Reads stdin line by line and writes replies to stdout. Besides plain
//! messages it understands:
//!
//! - `/context on` | `/context off`: toggle retrieval for the session
//! - `/context reset`: an update without the key, which restores the default
//! - `exit` | `quit` | `/exit` | `/quit` | `:q`: end the session

use async_trait::async_trait;
use docent_core::channel::{Channel, ChannelEvent, ChannelMessage};
use docent_core::error::ChannelError;
use docent_core::session::SettingsUpdate;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub const CLI_CHAT_ID: &str = "cli_session";
const CLI_SENDER: &str = "local_user";

/// Interactive CLI channel for terminal-based chat.
#[derive(Debug, Default)]
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

/// Interpret one input line. Blank lines yield nothing.
pub fn parse_line(line: &str) -> Option<Result<ChannelEvent, ChannelError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
        return Some(Ok(ChannelEvent::End));
    }

    if let Some(arg) = line
        .strip_prefix("/context")
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    {
        let update = match arg.trim() {
            "on" => SettingsUpdate::use_context(true),
            "off" => SettingsUpdate::use_context(false),
            "reset" => SettingsUpdate::new(),
            other => {
                return Some(Err(ChannelError::InvalidSettings(format!(
                    "expected `/context on|off|reset`, got `/context {other}`"
                ))));
            }
        };
        return Some(Ok(ChannelEvent::SettingsUpdate(update)));
    }

    Some(Ok(ChannelEvent::Message(ChannelMessage {
        sender_id: CLI_SENDER.into(),
        content: line.to_string(),
        chat_id: CLI_CHAT_ID.into(),
    })))
}

/// Forward events parsed from `reader` until EOF, an end command, or the
/// receiver going away. End-of-input is reported as [`ChannelEvent::End`].
pub async fn forward_lines<R>(reader: R, tx: mpsc::Sender<Result<ChannelEvent, ChannelError>>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(event) = parse_line(&line) else {
                    continue;
                };
                let is_end = matches!(event, Ok(ChannelEvent::End));
                if tx.send(event).await.is_err() || is_end {
                    break;
                }
            }
            Ok(None) => {
                tracing::debug!("Input closed");
                let _ = tx.send(Ok(ChannelEvent::End)).await;
                break;
            }
            Err(e) => {
                let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                break;
            }
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelEvent, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(forward_lines(BufReader::new(io::stdin()), tx));
        Ok(rx)
    }

    async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }
}
