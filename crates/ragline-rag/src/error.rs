use ragline_llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("source not found: {0}")]
    NotFound(String),

    #[error("{what} mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} contains a non-finite value")]
    NonFiniteEmbedding(&'static str),

    #[error("embedding service failed: {0}")]
    EmbeddingService(#[source] LlmError),

    #[error("generation service failed: {0}")]
    GenerationService(#[source] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("vector store error: {0}")]
    Storage(String),

    #[error("blocking runtime unavailable: {0}")]
    Runtime(#[source] std::io::Error),
}
