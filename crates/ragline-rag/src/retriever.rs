//! Query-time lookup of the chunks most relevant to a question.

use crate::document::Chunk;
use crate::error::RagError;
use crate::vector_store::VectorStore;

pub const DEFAULT_TOP_K: usize = 5;

/// Turns a query embedding into a ranked list of chunks.
pub trait Retriever: Send + Sync {
    /// `query_text` is available to strategies that look at the raw question.
    /// `top_k`, when given, replaces the retriever's own default.
    ///
    /// # Errors
    ///
    /// Propagates store errors such as [`RagError::DimensionMismatch`].
    fn retrieve(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        store: &dyn VectorStore,
        top_k: Option<usize>,
    ) -> Result<Vec<Chunk>, RagError>;
}

/// Retrieval configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieverConfig {
    /// Chunks returned when the caller does not ask for a specific count.
    pub top_k: usize,
    /// Minimum cosine similarity to accept; `None` keeps every hit.
    pub score_threshold: Option<f32>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            score_threshold: None,
        }
    }
}

/// Plain nearest-neighbour retrieval.
#[derive(Debug, Clone, Default)]
pub struct SimilarityRetriever {
    config: RetrieverConfig,
}

impl SimilarityRetriever {
    #[must_use]
    pub fn new(config: RetrieverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }
}

impl Retriever for SimilarityRetriever {
    fn retrieve(
        &self,
        query_embedding: &[f32],
        _query_text: &str,
        store: &dyn VectorStore,
        top_k: Option<usize>,
    ) -> Result<Vec<Chunk>, RagError> {
        let k = top_k.unwrap_or(self.config.top_k);
        let hits = store.similarity_search(query_embedding, k)?;
        let found = hits.len();

        let chunks: Vec<Chunk> = hits
            .into_iter()
            .filter(|hit| self.config.score_threshold.is_none_or(|min| hit.score >= min))
            .map(|hit| hit.chunk)
            .collect();

        tracing::debug!(top_k = k, found, kept = chunks.len(), "retrieved chunks");
        Ok(chunks)
    }
}
