//! The assistant trait shared by both orchestrators.

use async_trait::async_trait;
use docent_core::session::ChatSession;

use crate::reply::Reply;

/// Turns one user message into exactly one reply.
///
/// `session` is `None` when the chat surface never initialized one; every
/// implementation answers that with a not-initialized notice.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Short mode name for logs (e.g., "document", "tool").
    fn mode(&self) -> &str;

    /// Handle one user turn. Provider, retrieval and tool failures are
    /// returned as errors; empty results become a notice.
    async fn handle(
        &self,
        text: &str,
        session: Option<&mut ChatSession>,
    ) -> docent_core::Result<Reply>;
}
