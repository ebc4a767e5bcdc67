//! Similarity scoring and evidence selection.

use ndarray::Array1;

use crate::types::RankedChunk;
use kennisbank_store::ChunkEmbedding;

/// Chunks must score strictly above this to be used as evidence.
pub const RELEVANCE_FLOOR: f64 = 0.7;

/// At most this many chunks go into the generator context.
pub const MAX_CONTEXT_CHUNKS: usize = 5;

/// Cosine similarity with f64 accumulation. Returns 0 when either vector
/// has zero norm or the dimensions disagree; never divides by zero.
pub fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Score every chunk against the question vector, keep those above the
/// relevance floor, order them best first, and truncate to the context
/// cap. The sort is stable, so equal scores keep their stored chunk
/// order and identical inputs always rank identically.
pub fn rank(question_vector: &Array1<f32>, chunks: &[ChunkEmbedding]) -> Vec<RankedChunk> {
    let mut ranked: Vec<RankedChunk> = chunks
        .iter()
        .map(|chunk| RankedChunk {
            document_id: chunk.document_id.clone(),
            chunk_text: chunk.chunk_text.clone(),
            similarity: cosine_similarity(question_vector, &chunk.embedding),
        })
        .filter(|r| r.similarity > RELEVANCE_FLOOR)
        .collect();

    ranked.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(MAX_CONTEXT_CHUNKS);
    ranked
}
