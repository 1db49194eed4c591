//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and top-k ranking over embedded chunks.

use docent_core::retrieval::Passage;

/// A chunk together with its embedding vector.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length, empty, or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank chunks by cosine similarity to a query embedding.
///
/// Returns at most `k` passages sorted by descending similarity, with
/// `score` set to the similarity. Ties keep index order.
pub fn rank_by_similarity(chunks: &[EmbeddedChunk], query_embedding: &[f32], k: usize) -> Vec<Passage> {
    let mut scored: Vec<(f32, &EmbeddedChunk)> = chunks
        .iter()
        .map(|chunk| (cosine_similarity(&chunk.embedding, query_embedding), chunk))
        .collect();

    // Stable sort: equal scores stay in insertion order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
        .into_iter()
        .map(|(score, chunk)| {
            let mut passage = chunk.passage.clone();
            passage.score = score;
            passage
        })
        .collect()
}
