//! Empty context provider: used when no document is loaded.

use async_trait::async_trait;

use docent_core::error::RetrievalError;
use docent_core::retrieval::{ContextProvider, Passage};

/// A context provider with nothing in it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContext;

#[async_trait]
impl ContextProvider for EmptyContext {
    fn name(&self) -> &str {
        "empty"
    }

    async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<Passage>, RetrievalError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_empty() {
        let ctx = EmptyContext;
        assert_eq!(ctx.name(), "empty");
        assert!(ctx.retrieve("anything", 4).await.unwrap().is_empty());
    }
}
