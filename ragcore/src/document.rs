//! Data types for chunks, search results, and query results.

use serde::{Deserialize, Serialize};

use crate::config::RagConfig;

/// Provenance and position of a [`Chunk`] within its source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Identifier of the source document (path, URL, or caller-supplied label).
    pub source: String,
    /// Zero-based position of this chunk within the source.
    pub chunk_index: usize,
    /// Total number of chunks the source produced.
    pub total_chunks: usize,
    /// SHA-256 hex digest of the chunk content. Deterministic over content only.
    pub content_hash: String,
}

/// A bounded, possibly-overlapping slice of a source document.
///
/// Chunks are the atomic unit of embedding and retrieval. They are created
/// by the [`DocumentProcessor`](crate::processor::DocumentProcessor) at
/// ingestion time and never mutated afterwards; the only way to remove them
/// is deleting the collection that holds them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub content: String,
    /// Provenance and position metadata.
    pub metadata: ChunkMetadata,
}

/// A retrieved chunk paired with a normalized relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk text.
    pub content: String,
    /// Normalized similarity in `[0, 1]`; higher is more relevant.
    pub score: f32,
    /// Metadata of the matching chunk.
    pub metadata: ChunkMetadata,
}

/// The outcome of a single-hop RAG query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The generated answer.
    pub answer: String,
    /// The sources the answer was grounded on. Empty when retrieval found nothing.
    pub sources: Vec<SearchResult>,
}

/// One retrieval round of a multi-hop query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopTrace {
    /// One-based retrieval round number.
    pub iteration: usize,
    /// The sub-query issued in this round.
    pub query: String,
    /// Raw result count returned by the store for this round.
    pub results_found: usize,
    /// How many of those were new after deduplication.
    pub new_sources: usize,
}

/// The outcome of a multi-hop RAG query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterativeQueryResult {
    /// The generated answer.
    pub answer: String,
    /// Deduplicated sources accumulated across all retrieval rounds.
    pub sources: Vec<SearchResult>,
    /// Retrieval rounds actually executed. Never exceeds the configured cap.
    pub iterations_used: usize,
    /// The original question followed by every reformulated sub-query.
    pub queries_issued: Vec<String>,
    /// Per-round retrieval trace.
    pub trace: Vec<HopTrace>,
}

/// Summary of a completed ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Source label the chunks were ingested under.
    pub source: String,
    /// Number of chunks written to the store.
    pub chunks_added: usize,
    /// Collection size after the ingestion.
    pub collection_size: usize,
}

/// Statistics for a vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of chunks currently stored.
    pub total_chunks: usize,
    /// Name of the collection.
    pub collection_name: String,
    /// Dimensionality of the stored embeddings.
    pub embedding_dimension: usize,
}

/// Engine-level statistics: collection state plus the active configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagStats {
    /// Statistics for the engine's collection.
    pub collection: CollectionStats,
    /// The configuration the engine is running with.
    pub config: RagConfig,
}
