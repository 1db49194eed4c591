//! In-memory embedding index.
//!
//! Chunks are embedded once at build time through the configured provider
//! and kept in memory. A query is embedded with the same model and ranked
//! against every stored chunk by cosine similarity.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::RwLock;

use docent_core::error::RetrievalError;
use docent_core::provider::{EmbeddingRequest, Provider};
use docent_core::retrieval::{ContextProvider, Passage};

use crate::loader::Document;
use crate::splitter::TextSplitter;
use crate::vector::{EmbeddedChunk, rank_by_similarity};

/// Texts sent per embedding request.
const EMBED_BATCH_SIZE: usize = 64;

/// Embedding requests in flight at once while building.
const EMBED_CONCURRENCY: usize = 4;

/// A `ContextProvider` over an embedded document corpus.
pub struct EmbeddingIndex {
    provider: Arc<dyn Provider>,
    embedding_model: String,
    chunks: RwLock<Vec<EmbeddedChunk>>,
}

impl EmbeddingIndex {
    /// An index with nothing in it yet.
    pub fn new(provider: Arc<dyn Provider>, embedding_model: impl Into<String>) -> Self {
        Self {
            provider,
            embedding_model: embedding_model.into(),
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Split, embed and store `documents`.
    pub async fn build(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        documents: &[Document],
        splitter: &TextSplitter,
    ) -> Result<Self, RetrievalError> {
        let index = Self::new(provider, embedding_model);
        index.add_documents(documents, splitter).await?;
        Ok(index)
    }

    /// Split, embed and append more documents.
    pub async fn add_documents(
        &self,
        documents: &[Document],
        splitter: &TextSplitter,
    ) -> Result<usize, RetrievalError> {
        let passages = splitter.split_documents(documents);
        if passages.is_empty() {
            return Ok(0);
        }

        let batches: Vec<Vec<Passage>> = passages
            .chunks(EMBED_BATCH_SIZE)
            .map(<[Passage]>::to_vec)
            .collect();

        let embedded: Vec<Vec<EmbeddedChunk>> = stream::iter(batches)
            .map(|batch| self.embed_batch(batch))
            .buffered(EMBED_CONCURRENCY)
            .try_collect()
            .await?;

        let added: usize = embedded.iter().map(Vec::len).sum();
        self.chunks
            .write()
            .await
            .extend(embedded.into_iter().flatten());

        tracing::info!(
            documents = documents.len(),
            chunks = added,
            model = %self.embedding_model,
            "Indexed documents"
        );
        Ok(added)
    }

    /// Number of stored chunks.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    async fn embed_batch(&self, batch: Vec<Passage>) -> Result<Vec<EmbeddedChunk>, RetrievalError> {
        let inputs: Vec<String> = batch.iter().map(|p| p.content.clone()).collect();
        let embeddings = self.embed(inputs).await?;
        Ok(batch
            .into_iter()
            .zip(embeddings)
            .map(|(passage, embedding)| EmbeddedChunk { passage, embedding })
            .collect())
    }

    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let expected = inputs.len();
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs,
            })
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != expected {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {expected} embeddings, got {}",
                response.embeddings.len()
            )));
        }
        Ok(response.embeddings)
    }
}

#[async_trait]
impl ContextProvider for EmbeddingIndex {
    fn name(&self) -> &str {
        "embedding_index"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if k == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::EmbeddingFailed("no embedding for query".into()))?;

        let chunks = self.chunks.read().await;
        let passages = rank_by_similarity(&chunks, &query_embedding, k);
        tracing::debug!(k, found = passages.len(), "Retrieved passages");
        Ok(passages)
    }
}
