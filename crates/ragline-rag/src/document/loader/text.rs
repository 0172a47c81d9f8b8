use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use crate::document::types::{Document, Metadata, SOURCE_KEY};
use crate::document::{DEFAULT_MAX_FILE_SIZE, DocumentLoader};
use crate::error::RagError;

/// Reads a UTF-8 text file into a single document.
#[derive(Debug, Clone)]
pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl TextLoader {
    #[must_use]
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md" | "markdown") => "text/markdown",
        _ => "text/plain",
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, source: &str) -> Result<Vec<Document>, RagError> {
        let path = Path::new(source);
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RagError::NotFound(source.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Err(RagError::NotFound(source.to_owned()));
        }
        if meta.len() > self.max_file_size {
            return Err(RagError::FileTooLarge(meta.len()));
        }

        let content = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_KEY.into(), Value::from(source));
        metadata.insert("file_type".into(), Value::from("text"));
        metadata.insert("file_name".into(), Value::from(file_name));
        metadata.insert("content_type".into(), Value::from(content_type(path)));

        tracing::debug!(source, bytes = meta.len(), "loaded text file");
        Ok(vec![Document::new(content, metadata)])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}
