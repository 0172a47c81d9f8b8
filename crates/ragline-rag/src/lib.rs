//! Retrieval-augmented generation over an in-memory vector index.
//!
//! Ingestion runs loader → splitter → embedder → store; a query runs
//! embedder → retriever → generator. [`RagPipeline`] wires the stages together.

mod blocking;
pub mod document;
pub mod embedder;
pub mod error;
pub mod generator;
pub mod in_memory_store;
pub mod pipeline;
pub mod retriever;
pub mod vector_store;

pub use document::{
    CharacterSplitter, Chunk, Document, DocumentLoader, Metadata, SplitterConfig, TextLoader,
    TextSplitter,
};
pub use embedder::{Embedder, ProviderEmbedder};
pub use error::RagError;
pub use generator::{Generator, ProviderGenerator};
pub use in_memory_store::InMemoryVectorStore;
pub use pipeline::{QueryResponse, RagPipeline};
pub use retriever::{Retriever, RetrieverConfig, SimilarityRetriever};
pub use vector_store::{ScoredChunk, VectorStore};
