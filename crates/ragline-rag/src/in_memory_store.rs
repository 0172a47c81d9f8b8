use std::cmp::Ordering;
use std::sync::RwLock;

use crate::document::Chunk;
use crate::error::RagError;
use crate::vector_store::{ScoredChunk, VectorStore};

#[derive(Default)]
struct Entries {
    embeddings: Vec<Vec<f32>>,
    chunks: Vec<Chunk>,
    dimension: Option<usize>,
}

/// Exhaustive cosine-similarity index held in process memory.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Entries>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .field("len", &self.len())
            .field("dimension", &self.dimension())
            .finish()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Higher score first, then earlier insertion. NaN ranks last.
fn rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    rank_key(b.1)
        .total_cmp(&rank_key(a.1))
        .then(a.0.cmp(&b.0))
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() { f32::NEG_INFINITY } else { score }
}

fn is_finite(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> RagError {
    RagError::Storage(e.to_string())
}

impl VectorStore for InMemoryVectorStore {
    fn add(&self, embeddings: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> Result<(), RagError> {
        if embeddings.len() != chunks.len() {
            return Err(RagError::DimensionMismatch {
                what: "embedding count",
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }
        let Some(first) = embeddings.first() else {
            return Ok(());
        };

        let mut entries = self.entries.write().map_err(poisoned)?;
        let expected = entries.dimension.unwrap_or(first.len());
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(RagError::DimensionMismatch {
                what: "embedding dimension",
                expected,
                actual: bad.len(),
            });
        }

        if !embeddings.iter().all(|e| is_finite(e)) {
            return Err(RagError::NonFiniteEmbedding("embedding"));
        }

        entries.dimension = Some(expected);
        entries.embeddings.extend(embeddings);
        entries.chunks.extend(chunks);
        tracing::debug!(total = entries.chunks.len(), dimension = expected, "vectors added");
        Ok(())
    }

    fn similarity_search(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let entries = self.entries.read().map_err(poisoned)?;
        let Some(dimension) = entries.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(RagError::DimensionMismatch {
                what: "query dimension",
                expected: dimension,
                actual: query.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if !is_finite(query) {
            return Err(RagError::NonFiniteEmbedding("query"));
        }

        let mut scored: Vec<(usize, f32)> = entries
            .embeddings
            .iter()
            .map(|e| cosine_similarity(query, e))
            .enumerate()
            .collect();
        if top_k < scored.len() {
            scored.select_nth_unstable_by(top_k - 1, rank);
            scored.truncate(top_k);
        }
        scored.sort_unstable_by(rank);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| ScoredChunk {
                chunk: entries.chunks[idx].clone(),
                score,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.read().map_or(0, |e| e.chunks.len())
    }

    fn dimension(&self) -> Option<usize> {
        self.entries.read().ok().and_then(|e| e.dimension)
    }
}
