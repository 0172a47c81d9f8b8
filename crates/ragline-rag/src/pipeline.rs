use std::sync::Arc;

use serde::Serialize;

use crate::blocking::block_on;
use crate::document::{Chunk, DocumentLoader, TextSplitter};
use crate::embedder::Embedder;
use crate::error::RagError;
use crate::generator::Generator;
use crate::retriever::Retriever;
use crate::vector_store::VectorStore;

/// Answer to a query plus the chunks it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    /// Exactly the chunks handed to the generator, in rank order.
    pub sources: Vec<Chunk>,
}

/// Wires loader, splitter, embedder, store, retriever and generator together.
pub struct RagPipeline<E, G> {
    loader: Box<dyn DocumentLoader>,
    splitter: Box<dyn TextSplitter>,
    embedder: E,
    store: Arc<dyn VectorStore>,
    retriever: Box<dyn Retriever>,
    generator: G,
}

impl<E: Embedder, G: Generator> RagPipeline<E, G> {
    #[must_use]
    pub fn new(
        loader: Box<dyn DocumentLoader>,
        splitter: Box<dyn TextSplitter>,
        embedder: E,
        store: Arc<dyn VectorStore>,
        retriever: Box<dyn Retriever>,
        generator: G,
    ) -> Self {
        Self {
            loader,
            splitter,
            embedder,
            store,
            retriever,
            generator,
        }
    }

    /// Load, split, embed and index `source`. Returns the number of chunks added.
    ///
    /// Nothing is added to the store unless every stage succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first loader, embedding or store error.
    pub async fn ingest(&self, source: &str) -> Result<usize, RagError> {
        let documents = self.loader.load(source)?;
        let chunks = self.splitter.split(&documents);
        if chunks.is_empty() {
            tracing::info!(source, "nothing to index");
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text().to_owned()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        let count = chunks.len();
        self.store.add(embeddings, chunks)?;
        tracing::info!(
            source,
            documents = documents.len(),
            chunks = count,
            total = self.store.len(),
            "ingested"
        );
        Ok(count)
    }

    /// Answer `text` using the retriever's default `top_k`.
    ///
    /// # Errors
    ///
    /// Returns the first embedding, retrieval or generation error.
    pub async fn query(&self, text: &str) -> Result<QueryResponse, RagError> {
        self.query_with_top_k(text, None).await
    }

    /// Answer `text`, retrieving `top_k` chunks when given.
    ///
    /// # Errors
    ///
    /// Returns the first embedding, retrieval or generation error.
    pub async fn query_with_top_k(
        &self,
        text: &str,
        top_k: Option<usize>,
    ) -> Result<QueryResponse, RagError> {
        let embedding = self.embedder.embed_query(text).await?;
        let sources = self
            .retriever
            .retrieve(&embedding, text, self.store.as_ref(), top_k)?;
        let answer = self.generator.generate(text, &sources).await?;
        tracing::info!(sources = sources.len(), "query answered");
        Ok(QueryResponse { answer, sources })
    }

    /// # Errors
    ///
    /// As [`RagPipeline::ingest`], plus [`RagError::Runtime`] when called from
    /// inside an async runtime.
    pub fn ingest_blocking(&self, source: &str) -> Result<usize, RagError> {
        block_on(self.ingest(source))
    }

    /// # Errors
    ///
    /// As [`RagPipeline::query`], plus [`RagError::Runtime`] when called from
    /// inside an async runtime.
    pub fn query_blocking(&self, text: &str) -> Result<QueryResponse, RagError> {
        block_on(self.query(text))
    }

    /// True until the first successful ingest that produced chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[must_use]
    pub fn indexed_chunks(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }
}

impl<E, G> std::fmt::Debug for RagPipeline<E, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("indexed_chunks", &self.store.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ragline_llm::mock::MockProvider;

    use super::*;
    use crate::document::{CharacterSplitter, SplitterConfig, TextLoader};
    use crate::embedder::ProviderEmbedder;
    use crate::generator::{NO_CONTEXT_ANSWER, ProviderGenerator};
    use crate::in_memory_store::InMemoryVectorStore;
    use crate::retriever::SimilarityRetriever;

    type MockPipeline = RagPipeline<ProviderEmbedder<MockProvider>, ProviderGenerator<MockProvider>>;

    fn pipeline(embed: MockProvider, chat: MockProvider, chunk_size: usize) -> MockPipeline {
        let splitter = CharacterSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap: chunk_size / 5,
        })
        .unwrap();
        RagPipeline::new(
            Box::new(TextLoader::default()),
            Box::new(splitter),
            ProviderEmbedder::new(embed),
            Arc::new(InMemoryVectorStore::new()),
            Box::new(SimilarityRetriever::default()),
            ProviderGenerator::new(chat),
        )
    }

    fn wide_mock() -> MockProvider {
        let mut mock = MockProvider::default();
        mock.embedding_dim = 256;
        mock
    }

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn ingest_three_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "words.txt", &"word ".repeat(440));
        let p = pipeline(wide_mock(), MockProvider::default(), 1000);

        assert_eq!(p.ingest(&path).await.unwrap(), 3);
        assert_eq!(p.indexed_chunks(), 3);

        let hits = p.store().similarity_search(&[1.0; 256], 10).unwrap();
        let mut indices: Vec<usize> = hits
            .iter()
            .map(|h| {
                assert_eq!(h.chunk.total_chunks(), Some(3));
                h.chunk.chunk_index().unwrap()
            })
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[tokio::test]
    async fn query_on_empty_store_answers_without_context() {
        let chat = MockProvider::default();
        let p = pipeline(wide_mock(), chat.clone(), 100);
        assert!(p.is_empty());

        let response = p.query("anything").await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert!(response.sources.is_empty());
        assert!(chat.recorded_chats().is_empty());
    }

    #[tokio::test]
    async fn query_returns_generator_sources() {
        let dir = tempfile::tempdir().unwrap();
        let rust = write(&dir, "rust.txt", "rust ownership borrowing lifetimes");
        let py = write(&dir, "py.txt", "python garbage collection interpreter");
        let chat = MockProvider::with_responses(vec!["Ownership.".into()]);
        let p = pipeline(wide_mock(), chat.clone(), 100);
        p.ingest(&rust).await.unwrap();
        p.ingest(&py).await.unwrap();

        let response = p
            .query_with_top_k("rust ownership borrowing", Some(1))
            .await
            .unwrap();
        assert_eq!(response.answer, "Ownership.");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].source(), Some(rust.as_str()));

        let chats = chat.recorded_chats();
        let prompt = &chats[0][1].content;
        assert!(prompt.contains("Document 1:\nrust ownership borrowing lifetimes"));
        assert!(!prompt.contains("Document 2:"));
    }

    #[tokio::test]
    async fn default_top_k_bounds_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "long.txt", &"alpha beta gamma ".repeat(100));
        let p = pipeline(wide_mock(), MockProvider::default(), 50);
        let added = p.ingest(&path).await.unwrap();
        assert!(added > 5);

        let response = p.query("alpha").await.unwrap();
        assert_eq!(response.sources.len(), 5);
    }

    #[tokio::test]
    async fn failed_embedding_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "long.txt", &"lorem ipsum ".repeat(100));
        let embed = wide_mock().with_embed_failure_after(0);
        let p = pipeline(embed, MockProvider::default(), 50);

        let err = p.ingest(&path).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingService(_)));
        assert!(p.is_empty());
    }

    #[tokio::test]
    async fn missing_source_is_not_found() {
        let p = pipeline(wide_mock(), MockProvider::default(), 100);
        let err = p.ingest("/no/such/file.txt").await.unwrap_err();
        assert!(matches!(err, RagError::NotFound(_)));
        assert!(p.is_empty());
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", "some content");
        let p = pipeline(wide_mock(), MockProvider::failing(), 100);
        p.ingest(&path).await.unwrap();

        let err = p.query("content").await.unwrap_err();
        assert!(matches!(err, RagError::GenerationService(_)));
    }

    #[tokio::test]
    async fn embedding_dimension_change_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", "some content");
        let p = pipeline(wide_mock(), MockProvider::default(), 100);
        p.ingest(&path).await.unwrap();

        let narrow = pipeline(MockProvider::default(), MockProvider::default(), 100);
        let other = RagPipeline::new(
            Box::new(TextLoader::default()),
            Box::new(CharacterSplitter::new(SplitterConfig::default()).unwrap()),
            narrow.embedder,
            Arc::clone(p.store()),
            Box::new(SimilarityRetriever::default()),
            narrow.generator,
        );
        let err = other.ingest(&path).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
        assert_eq!(p.indexed_chunks(), 1);
    }

    #[test]
    fn blocking_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", "blocking callers get the same pipeline");
        let p = pipeline(wide_mock(), MockProvider::default(), 100);

        assert_eq!(p.ingest_blocking(&path).unwrap(), 1);
        let response = p.query_blocking("pipeline").unwrap();
        assert_eq!(response.answer, "mock response");
        assert_eq!(response.sources.len(), 1);
    }

    #[test]
    fn query_response_serializes() {
        let response = QueryResponse {
            answer: "a".into(),
            sources: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["answer"], "a");
        assert!(json["sources"].as_array().unwrap().is_empty());
    }
}
