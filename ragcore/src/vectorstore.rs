//! Vector store trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, CollectionStats, SearchResult};
use crate::error::Result;

/// A [`Chunk`] paired with its embedding, the unit handed to a store.
///
/// Embeddings live only at the storage boundary; [`Chunk`] itself carries
/// no vector so retrieval results stay lean.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// The chunk being persisted.
    pub chunk: Chunk,
    /// The embedding of the chunk's content.
    pub embedding: Vec<f32>,
}

/// A storage backend for chunk embeddings with similarity search.
///
/// Implementations manage named collections and are responsible for
/// converting their native distance metric into a normalized similarity in
/// `[0, 1]` before returning results — callers never see raw distances.
///
/// Writes to one collection must be externally serialized unless the
/// backend guarantees more; implementations here model single-writer,
/// many-reader semantics.
///
/// # Example
///
/// ```rust,ignore
/// use ragcore::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs", 384).await?;
/// store.upsert("docs", &records).await?;
/// let results = store.search("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert records into a collection, keyed by content hash.
    ///
    /// Re-upserting a record whose chunk has the same content hash replaces
    /// the stored entry instead of appending a duplicate.
    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending similarity. A collection that
    /// does not exist or holds nothing yields an empty list, not an error.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Report collection statistics. A missing collection reports zero chunks.
    async fn stats(&self, collection: &str) -> Result<CollectionStats>;
}
