//! Context retrieval for docent.
//!
//! Turns documents into ranked passages:
//! load text → split into overlapping chunks → embed through the provider
//! → rank by cosine similarity against the embedded question.

pub mod empty;
pub mod index;
pub mod loader;
pub mod splitter;
pub mod vector;

pub use empty::EmptyContext;
pub use index::EmbeddingIndex;
pub use loader::{Document, load_documents};
pub use splitter::TextSplitter;
pub use vector::{EmbeddedChunk, cosine_similarity, rank_by_similarity};
