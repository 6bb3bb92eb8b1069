//! Document processing: overlap-aware chunking and PDF text extraction.
//!
//! [`DocumentProcessor`] splits raw text into windows targeting the
//! configured chunk size. Splits prefer semantic boundaries (paragraph,
//! then line, then sentence) over raw character cuts, and each window
//! after the first carries trailing context from its predecessor so that
//! meaning spanning a boundary stays retrievable.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::document::{Chunk, ChunkMetadata};
use crate::error::{RagError, Result};

/// Sentence-ending separators, tried after paragraph and line breaks.
const SENTENCE_SEPARATORS: [&str; 3] = [". ", "! ", "? "];

/// Splits documents into bounded, overlapping chunks.
///
/// All window arithmetic is in characters and respects UTF-8 boundaries.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentProcessor {
    /// Create a new processor.
    ///
    /// Callers are expected to pass values already validated by
    /// [`RagConfig`](crate::config::RagConfig); `chunk_overlap` must be
    /// smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split text into chunks with trailing overlap between neighbors.
    ///
    /// Input shorter than the chunk size yields exactly one chunk equal to
    /// the input. Empty or whitespace-only input yields an empty `Vec`.
    pub fn process_text(&self, text: &str, source: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus an end sentinel.
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        let n_chars = bounds.len() - 1;

        let windows = if n_chars <= self.chunk_size {
            vec![text.to_string()]
        } else {
            self.split_windows(text, &bounds, n_chars)
        };

        let total_chunks = windows.len();
        let chunks: Vec<Chunk> = windows
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| {
                let content_hash = chunk_hash(&content);
                Chunk {
                    content,
                    metadata: ChunkMetadata {
                        source: source.to_string(),
                        chunk_index,
                        total_chunks,
                        content_hash,
                    },
                }
            })
            .collect();

        info!(source, chunk_count = chunks.len(), "processed text");
        chunks
    }

    /// Extract text from a PDF page by page and delegate to [`process_text`](Self::process_text).
    ///
    /// Pages with no extractable text are skipped. A PDF that yields no
    /// text at all produces an empty `Vec`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if the file cannot be read or
    /// parsed as a PDF.
    pub fn process_pdf(&self, path: impl AsRef<Path>) -> Result<Vec<Chunk>> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let doc = lopdf::Document::load(path).map_err(|e| {
            RagError::ChunkingError(format!("failed to load PDF '{source}': {e}"))
        })?;

        let mut pages = Vec::new();
        for &page_number in doc.get_pages().keys() {
            match doc.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => pages.push(text.trim().to_string()),
                Ok(_) => {}
                Err(e) => {
                    warn!(%source, page_number, error = %e, "skipping unextractable page");
                }
            }
        }

        info!(%source, page_count = pages.len(), "extracted PDF text");
        Ok(self.process_text(&pages.join("\n\n"), &source))
    }

    /// Walk the text producing windows of at most `chunk_size` chars.
    ///
    /// Each window ends at the latest acceptable semantic boundary within
    /// range, falling back to a raw cut at `chunk_size`. The next window
    /// starts `chunk_overlap` chars before the previous cut.
    fn split_windows(&self, text: &str, bounds: &[usize], n_chars: usize) -> Vec<String> {
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(n_chars);
            if end == n_chars {
                windows.push(text[bounds[start]..bounds[end]].to_string());
                break;
            }

            let cut = self.find_cut(text, bounds, start, end);
            windows.push(text[bounds[start]..bounds[cut]].to_string());
            // A cut is only accepted beyond start + overlap, so this always advances.
            start = cut - self.chunk_overlap;
        }

        windows
    }

    /// Pick the cut point for the window `[start, end)` in char positions.
    ///
    /// Tries paragraph breaks, then line breaks, then sentence boundaries,
    /// keeping the separator attached to the preceding chunk. A boundary is
    /// only accepted if the resulting chunk is longer than the overlap;
    /// otherwise the window is cut at `end`.
    fn find_cut(&self, text: &str, bounds: &[usize], start: usize, end: usize) -> usize {
        let window = &text[bounds[start]..bounds[end]];
        let min_cut_byte = bounds[start + self.chunk_overlap + 1] - bounds[start];

        for separator in ["\n\n", "\n"] {
            if let Some(cut) = rfind_separator_end(window, separator, min_cut_byte) {
                return char_position(bounds, bounds[start] + cut);
            }
        }

        let best = SENTENCE_SEPARATORS
            .iter()
            .filter_map(|sep| rfind_separator_end(window, sep, min_cut_byte))
            .max();
        if let Some(cut) = best {
            return char_position(bounds, bounds[start] + cut);
        }

        end
    }
}

/// Byte offset just past the last occurrence of `separator` in `window`,
/// provided that offset is at least `min_end`.
fn rfind_separator_end(window: &str, separator: &str, min_end: usize) -> Option<usize> {
    let pos = window.rfind(separator)?;
    let end = pos + separator.len();
    (end >= min_end).then_some(end)
}

/// Map a byte offset back to its char position via the boundary table.
fn char_position(bounds: &[usize], byte: usize) -> usize {
    // Separators are ASCII, so `byte` always lands on a recorded boundary.
    bounds.binary_search(&byte).unwrap_or_else(|i| i)
}

/// SHA-256 hex digest of chunk content; the idempotency/dedup key.
///
/// Deterministic over content only — metadata never feeds the hash.
pub fn chunk_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(1000, 200)
    }

    /// Separator-free text so cuts land exactly at the chunk size.
    fn plain_text(len: usize) -> String {
        (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect()
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        assert_eq!(chunk_hash("alpha"), chunk_hash("alpha"));
        assert_ne!(chunk_hash("alpha"), chunk_hash("beta"));
        assert_eq!(chunk_hash("").len(), 64);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(processor().process_text("", "s").is_empty());
        assert!(processor().process_text("   \n\t", "s").is_empty());
    }

    #[test]
    fn short_input_yields_single_chunk_equal_to_input() {
        let chunks = processor().process_text("The quick brown fox", "s");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "The quick brown fox");
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
        assert_eq!(chunks[0].metadata.content_hash, chunk_hash("The quick brown fox"));
    }

    #[test]
    fn long_input_produces_exact_overlap_without_separators() {
        let text = plain_text(3000);
        let chunks = processor().process_text(&text, "s");

        assert_eq!(chunks.len(), 4);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].content.chars().rev().take(200).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let head: String = pair[1].content.chars().take(200).collect();
            assert_eq!(tail, head);
        }
        assert_eq!(chunks[0].content.chars().count(), 1000);
        assert_eq!(chunks[3].content.chars().count(), 600);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, 4);
        }
    }

    #[test]
    fn cut_prefers_paragraph_boundary() {
        let mut text = plain_text(950);
        text.push_str("\n\n");
        text.push_str(&plain_text(400));

        let chunks = processor().process_text(&text, "s");
        assert!(chunks[0].content.ends_with("\n\n"));
        assert_eq!(chunks[0].content.chars().count(), 952);
    }

    #[test]
    fn cut_falls_back_to_sentence_boundary() {
        let mut text = plain_text(600);
        text.push_str(". ");
        text.push_str(&plain_text(800));

        let chunks = processor().process_text(&text, "s");
        assert!(chunks[0].content.ends_with(". "));
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text: String = "héllø wörld ".repeat(300);
        let chunks = DocumentProcessor::new(100, 20).process_text(&text, "s");
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].content.chars().rev().take(20).collect::<Vec<_>>()
                .into_iter().rev().collect();
            assert!(pair[1].content.starts_with(&tail));
        }
    }

    #[test]
    fn missing_pdf_reports_chunking_error() {
        let err = processor().process_pdf("/nonexistent/report.pdf").unwrap_err();
        assert!(matches!(err, RagError::ChunkingError(_)));
    }
}
