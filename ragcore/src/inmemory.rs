//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps collections in a `HashMap` behind a
//! `tokio::sync::RwLock` — single writer, many readers. Entries are keyed
//! by chunk content hash, so re-ingesting identical content replaces the
//! existing entry instead of accumulating duplicate vectors.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{CollectionStats, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{ChunkRecord, VectorStore};

#[derive(Debug)]
struct Collection {
    dimensions: usize,
    entries: HashMap<String, ChunkRecord>,
}

/// An in-memory vector store suitable for development, testing, and
/// small corpora.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine distance between two vectors, in `[0, 2]`.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// Convert a cosine distance to a normalized similarity in `[0, 1]`.
fn similarity_from_distance(distance: f32) -> f32 {
    (1.0 - distance).clamp(0.0, 1.0)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, entries: HashMap::new() });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| RagError::VectorStoreError {
            backend: "InMemory".to_string(),
            message: format!("collection '{collection}' does not exist"),
        })?;

        for record in records {
            if record.embedding.len() != store.dimensions {
                return Err(RagError::VectorStoreError {
                    backend: "InMemory".to_string(),
                    message: format!(
                        "embedding dimension {} does not match collection dimension {}",
                        record.embedding.len(),
                        store.dimensions
                    ),
                });
            }
            store.entries.insert(record.chunk.metadata.content_hash.clone(), record.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let Some(store) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<SearchResult> = store
            .entries
            .values()
            .map(|record| SearchResult {
                content: record.chunk.content.clone(),
                score: similarity_from_distance(cosine_distance(&record.embedding, embedding)),
                metadata: record.chunk.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn stats(&self, collection: &str) -> Result<CollectionStats> {
        let collections = self.collections.read().await;
        let (total_chunks, embedding_dimension) = collections
            .get(collection)
            .map(|c| (c.entries.len(), c.dimensions))
            .unwrap_or((0, 0));

        Ok(CollectionStats {
            total_chunks,
            collection_name: collection.to_string(),
            embedding_dimension,
        })
    }
}
