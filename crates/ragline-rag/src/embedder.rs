use std::future::Future;

use ragline_llm::{LlmError, LlmProvider};

use crate::blocking::block_on;
use crate::error::RagError;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Maps text to fixed-length vectors.
pub trait Embedder: Send + Sync {
    /// Embed many texts; the output has one vector per input, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingService`] if the backing service fails.
    fn embed_documents(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, RagError>> + Send;

    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingService`] if the backing service fails.
    fn embed_query(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, RagError>> + Send;

    /// Blocking form of [`Embedder::embed_documents`].
    ///
    /// # Errors
    ///
    /// As [`Embedder::embed_documents`], plus [`RagError::Runtime`] when called
    /// from inside an async runtime.
    fn embed_documents_blocking(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        block_on(self.embed_documents(texts))
    }

    /// Blocking form of [`Embedder::embed_query`].
    ///
    /// # Errors
    ///
    /// As [`Embedder::embed_query`], plus [`RagError::Runtime`] when called
    /// from inside an async runtime.
    fn embed_query_blocking(&self, text: &str) -> Result<Vec<f32>, RagError> {
        block_on(self.embed_query(text))
    }
}

/// Embedder backed by an [`LlmProvider`], sending bulk input in fixed-size batches.
#[derive(Debug, Clone)]
pub struct ProviderEmbedder<P> {
    provider: P,
    batch_size: usize,
}

impl<P: LlmProvider> ProviderEmbedder<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: LlmProvider> Embedder for ProviderEmbedder<P> {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!(
                provider = self.provider.name(),
                size = batch.len(),
                "embedding batch"
            );
            let embedded = self
                .provider
                .embed_batch(batch)
                .await
                .map_err(RagError::EmbeddingService)?;
            if embedded.len() != batch.len() {
                return Err(RagError::EmbeddingService(LlmError::EmbeddingCount {
                    provider: self.provider.name().to_owned(),
                    expected: batch.len(),
                    actual: embedded.len(),
                }));
            }
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.provider
            .embed(text)
            .await
            .map_err(RagError::EmbeddingService)
    }
}
