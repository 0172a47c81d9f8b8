use serde::Serialize;

use crate::document::Chunk;
use crate::error::RagError;

/// A chunk returned from a similarity search together with its cosine score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Index of `(embedding, chunk)` pairs supporting nearest-neighbour lookup.
pub trait VectorStore: Send + Sync {
    /// Append embeddings and their chunks as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the two lists differ in length
    /// or an embedding's dimension disagrees with the store's. Nothing is
    /// appended on error.
    fn add(&self, embeddings: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> Result<(), RagError>;

    /// Return at most `top_k` entries, most similar first; ties keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the query dimension differs
    /// from the stored one.
    fn similarity_search(&self, query: &[f32], top_k: usize)
    -> Result<Vec<ScoredChunk>, RagError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension adopted from the first embedding added, if any.
    fn dimension(&self) -> Option<usize>;
}
