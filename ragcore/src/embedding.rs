//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-dimension vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface, selected at engine construction time. Every call is an
/// external-I/O boundary: implementations must enforce a request timeout and
/// surface failures as [`RagError::EmbeddingUnavailable`](crate::error::RagError::EmbeddingUnavailable)
/// rather than hanging or silently returning nothing.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends with native
/// batching should override it — ingestion routes every chunk through a
/// single batch call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Batched backends fail atomically: either every input is embedded or
    /// the whole call returns an error.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
