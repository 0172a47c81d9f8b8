use serde::Serialize;
use uuid::Uuid;

/// Open key-value bag attached to documents and chunks; keeps insertion order.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

pub const CHUNK_INDEX_KEY: &str = "chunk_index";
pub const TOTAL_CHUNKS_KEY: &str = "total_chunks";
pub const SOURCE_KEY: &str = "source";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    content: String,
    metadata: Metadata,
    doc_id: String,
}

impl Document {
    /// Create a document with a freshly generated id.
    #[must_use]
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
            doc_id: Uuid::new_v4().to_string(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    text: String,
    metadata: Metadata,
    doc_id: String,
    chunk_id: String,
}

impl Chunk {
    /// Create a chunk belonging to the document `doc_id`, with a fresh chunk id.
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: Metadata, doc_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata,
            doc_id: doc_id.into(),
            chunk_id: Uuid::new_v4().to_string(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    #[must_use]
    pub fn chunk_id(&self) -> &str {
        &self.chunk_id
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(|v| v.as_str())
    }

    #[must_use]
    pub fn chunk_index(&self) -> Option<usize> {
        self.metadata_usize(CHUNK_INDEX_KEY)
    }

    #[must_use]
    pub fn total_chunks(&self) -> Option<usize> {
        self.metadata_usize(TOTAL_CHUNKS_KEY)
    }

    fn metadata_usize(&self, key: &str) -> Option<usize> {
        self.metadata
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }
}
