use std::ops::Range;

use serde_json::Value;

use super::TextSplitter;
use super::types::{CHUNK_INDEX_KEY, Chunk, Document, TOTAL_CHUNKS_KEY};
use crate::error::RagError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if `chunk_size` is zero or
    /// `chunk_overlap` is not smaller than `chunk_size`.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Character-bounded splitter that prefers to break at spaces.
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    config: SplitterConfig,
}

impl CharacterSplitter {
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: SplitterConfig) -> Result<Self, RagError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split raw text into trimmed pieces, in text order.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        windows(&chars, self.config.chunk_size, self.config.chunk_overlap)
            .into_iter()
            .map(|range| {
                let piece: String = chars[range].iter().collect();
                piece.trim().to_owned()
            })
            .collect()
    }
}

impl TextSplitter for CharacterSplitter {
    fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for doc in documents {
            let pieces = self.split_text(doc.content());
            let total = pieces.len();
            for (i, text) in pieces.into_iter().enumerate() {
                let mut metadata = doc.metadata().clone();
                metadata.insert(CHUNK_INDEX_KEY.into(), Value::from(i));
                metadata.insert(TOTAL_CHUNKS_KEY.into(), Value::from(total));
                chunks.push(Chunk::new(text, metadata, doc.doc_id()));
            }
            tracing::debug!(doc_id = doc.doc_id(), chunks = total, "split document");
        }
        chunks
    }
}

/// Character ranges of the pieces, before trimming.
///
/// Requires `size > 0`. A window that stops short of the text end breaks at
/// its last space (excluded) or is hard cut `size` characters in. The next
/// window starts `overlap` characters before the unclamped break, so the tail
/// may yield a piece wholly inside its predecessor. Range starts strictly
/// increase and the last range ends at the text end.
fn windows(chars: &[char], size: usize, overlap: usize) -> Vec<Range<usize>> {
    let len = chars.len();
    if len <= size {
        return vec![0..len];
    }

    let mut ranges = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = start + size;
        if end < len
            && let Some(pos) = chars[start + 1..end].iter().rposition(|&c| c == ' ')
        {
            end = start + 1 + pos;
        }
        ranges.push(start..end.min(len));
        start = end.saturating_sub(overlap).max(start + 1);
    }
    ranges
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::document::Metadata;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> CharacterSplitter {
        CharacterSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })
        .unwrap()
    }

    fn doc(content: &str) -> Document {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!("test.txt"));
        Document::new(content, metadata)
    }

    #[test]
    fn default_config() {
        let config = SplitterConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = CharacterSplitter::new(SplitterConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        })
        .unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        for overlap in [10, 11] {
            let result = CharacterSplitter::new(SplitterConfig {
                chunk_size: 10,
                chunk_overlap: overlap,
            });
            assert!(matches!(result, Err(RagError::InvalidConfig(_))));
        }
    }

    #[test]
    fn short_text_is_single_trimmed_chunk() {
        let pieces = splitter(100, 10).split_text("  Hello world.  ");
        assert_eq!(pieces, ["Hello world."]);
    }

    #[test]
    fn empty_text_is_single_empty_chunk() {
        let pieces = splitter(100, 10).split_text("");
        assert_eq!(pieces, [""]);
    }

    #[test]
    fn breaks_at_last_space_in_window() {
        let pieces = splitter(10, 0).split_text("aaaa bbbb cccc");
        assert_eq!(pieces, ["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn hard_cut_without_spaces() {
        let text = "a".repeat(25);
        let pieces = splitter(10, 3).split_text(&text);
        let lens: Vec<usize> = pieces.iter().map(String::len).collect();
        assert_eq!(lens, [10, 10, 10, 4]);
    }

    #[test]
    fn tail_window_is_emitted_after_reaching_text_end() {
        let pieces = splitter(1000, 200).split_text(&"a".repeat(1700));
        let lens: Vec<usize> = pieces.iter().map(String::len).collect();
        assert_eq!(lens, [1000, 900, 100]);
    }

    #[test]
    fn tail_window_metadata_counts_every_piece() {
        let chunks = splitter(10, 4).split(&[doc(&"x".repeat(19))]);
        // windows: 0..10, 6..16, 12..19, 18..19
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.total_chunks() == Some(4)));
        assert_eq!(chunks[3].text(), "x");
    }

    #[test]
    fn leading_space_is_not_a_break_point() {
        let text = format!(" {}", "b".repeat(20));
        let ranges = windows(&text.chars().collect::<Vec<_>>(), 10, 2);
        assert_eq!(ranges[0], 0..10);
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        let text = "é".repeat(10);
        let pieces = splitter(10, 2).split_text(&text);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].chars().count(), 10);
    }

    #[test]
    fn three_chunk_document_metadata() {
        let text = "word ".repeat(440);
        let chunks = splitter(1000, 200).split(&[doc(&text)]);

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index(), Some(i));
            assert_eq!(chunk.total_chunks(), Some(3));
            assert_eq!(chunk.source(), Some("test.txt"));
            assert!(chunk.text().chars().count() <= 1000);
            assert!(!chunk.text().ends_with("wor"));
        }
    }

    #[test]
    fn chunks_keep_document_order_and_ids() {
        let first = doc(&"alpha ".repeat(40));
        let second = doc("beta");
        let chunks = splitter(100, 20).split(&[first.clone(), second.clone()]);

        let (head, tail) = chunks.split_at(chunks.len() - 1);
        assert!(head.iter().all(|c| c.doc_id() == first.doc_id()));
        assert_eq!(tail[0].doc_id(), second.doc_id());
        assert_eq!(tail[0].text(), "beta");
        assert_eq!(tail[0].total_chunks(), Some(1));
    }

    #[test]
    fn chunk_ids_are_unique() {
        let chunks = splitter(20, 5).split(&[doc(&"lorem ipsum ".repeat(20))]);
        let mut ids: Vec<&str> = chunks.iter().map(Chunk::chunk_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), chunks.len());
    }

    #[test]
    fn no_documents_no_chunks() {
        assert!(splitter(10, 2).split(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn windows_cover_text_without_gaps(
            text in "[a-z ]{0,400}",
            size in 1usize..60,
            overlap_frac in 0.0f64..1.0,
        ) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let overlap = ((size as f64) * overlap_frac) as usize;
            let overlap = overlap.min(size - 1);
            let chars: Vec<char> = text.chars().collect();
            let ranges = windows(&chars, size, overlap);

            prop_assert!(!ranges.is_empty());
            prop_assert_eq!(ranges[0].start, 0);
            prop_assert_eq!(ranges.last().unwrap().end, chars.len());
            for r in &ranges {
                prop_assert!(r.end - r.start <= size);
            }
            for pair in ranges.windows(2) {
                prop_assert!(pair[1].start > pair[0].start);
                prop_assert!(pair[1].start <= pair[0].end);
            }
        }

        #[test]
        fn short_text_single_chunk(text in "[a-zA-Z0-9 ]{0,50}") {
            let pieces = splitter(50, 10).split_text(&text);
            prop_assert_eq!(pieces, vec![text.trim().to_owned()]);
        }

        #[test]
        fn pieces_are_substrings(text in "[a-z ]{0,300}", size in 2usize..40) {
            let s = splitter(size, size / 2);
            for piece in s.split_text(&text) {
                prop_assert!(text.contains(&piece));
                prop_assert!(piece.chars().count() <= size);
            }
        }
    }
}
