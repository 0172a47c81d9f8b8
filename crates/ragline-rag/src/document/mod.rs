pub mod loader;
pub mod splitter;
pub mod types;

pub use loader::TextLoader;
pub use splitter::{CharacterSplitter, SplitterConfig};
pub use types::{Chunk, Document, Metadata};

use crate::error::RagError;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Turns a source identifier (a file path for the built-in loader) into documents.
pub trait DocumentLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if the source does not exist, or another
    /// error if it exists but cannot be read.
    fn load(&self, source: &str) -> Result<Vec<Document>, RagError>;

    fn supported_extensions(&self) -> &[&str];
}

/// Splits documents into ordered, possibly overlapping chunks.
pub trait TextSplitter: Send + Sync {
    /// Chunks come out grouped by document, in document order, then in text order.
    fn split(&self, documents: &[Document]) -> Vec<Chunk>;
}
