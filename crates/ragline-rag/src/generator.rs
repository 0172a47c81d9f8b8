use std::fmt::Write;
use std::future::Future;

use ragline_llm::{LlmProvider, Message};

use crate::blocking::block_on;
use crate::document::Chunk;
use crate::error::RagError;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based on the provided context.";

/// Returned without contacting the service when retrieval found nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I could not find any relevant information in the ingested documents to answer this question.";

/// Produces an answer to a question from retrieved chunks.
pub trait Generator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RagError::GenerationService`] if the backing service fails.
    fn generate(
        &self,
        query: &str,
        documents: &[Chunk],
    ) -> impl Future<Output = Result<String, RagError>> + Send;

    /// Blocking form of [`Generator::generate`].
    ///
    /// # Errors
    ///
    /// As [`Generator::generate`], plus [`RagError::Runtime`] when called
    /// from inside an async runtime.
    fn generate_blocking(&self, query: &str, documents: &[Chunk]) -> Result<String, RagError> {
        block_on(self.generate(query, documents))
    }
}

/// Number and label each chunk, in the order given, separated by blank lines.
#[must_use]
pub fn build_context(documents: &[Chunk]) -> String {
    let mut context = String::new();
    for (i, doc) in documents.iter().enumerate() {
        if i > 0 {
            context.push_str("\n\n");
        }
        let _ = write!(context, "Document {}:\n{}", i + 1, doc.text());
    }
    context
}

#[must_use]
pub fn build_prompt(query: &str, documents: &[Chunk]) -> String {
    format!(
        "Answer the question based on the following context:\n\n\
         Context:\n{}\n\n\
         Question: {query}\n\n\
         Answer:",
        build_context(documents)
    )
}

/// Generator backed by an [`LlmProvider`] chat call.
#[derive(Debug, Clone)]
pub struct ProviderGenerator<P> {
    provider: P,
}

impl<P: LlmProvider> ProviderGenerator<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: LlmProvider> Generator for ProviderGenerator<P> {
    async fn generate(&self, query: &str, documents: &[Chunk]) -> Result<String, RagError> {
        if documents.is_empty() {
            tracing::debug!("no context retrieved, skipping generation");
            return Ok(NO_CONTEXT_ANSWER.to_owned());
        }

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(build_prompt(query, documents)),
        ];
        tracing::debug!(
            provider = self.provider.name(),
            documents = documents.len(),
            "generating answer"
        );
        self.provider
            .chat(&messages)
            .await
            .map_err(RagError::GenerationService)
    }
}
