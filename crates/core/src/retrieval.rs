//! Context provider trait: ranked passages for a query.
//!
//! A context provider sits in front of a pre-indexed document corpus. The
//! orchestrator asks it for the `k` passages most relevant to the user's
//! question and treats an empty answer as "no context".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// One retrieved chunk of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// The chunk text
    pub content: String,

    /// Where the chunk came from (file name, URL, …)
    pub source: String,

    /// Position of the chunk within its source
    pub chunk_index: usize,

    /// Relevance under the provider's own metric (higher is better)
    #[serde(default)]
    pub score: f32,
}

impl Passage {
    pub fn new(content: impl Into<String>, source: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            chunk_index,
            score: 0.0,
        }
    }
}

/// The core ContextProvider trait.
///
/// Implementations: in-memory embedding index, empty (no document loaded).
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// The provider name (e.g., "embedding_index", "empty").
    fn name(&self) -> &str;

    /// Return at most `k` passages, most relevant first. An empty vector
    /// means nothing relevant was found.
    async fn retrieve(&self, query: &str, k: usize) -> std::result::Result<Vec<Passage>, RetrievalError>;
}
