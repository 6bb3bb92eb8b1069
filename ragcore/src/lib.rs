//! # ragcore
//!
//! A retrieval-augmented generation (RAG) engine: ingest documents, split
//! them into overlapping chunks, store vector embeddings, retrieve the most
//! relevant chunks for a question, and produce a grounded answer — through
//! multiple retrieval hops when a single pass is not enough.
//!
//! ## Overview
//!
//! The crate is organized around one orchestrator and three swappable
//! capabilities:
//!
//! - [`RagEngine`] — ingestion and querying, including iterative multi-hop
//!   retrieval with a hard iteration cap
//! - [`EmbeddingProvider`] — text → fixed-dimension vector
//! - [`AnswerGenerator`] — prompt → generated text (also used for query
//!   reformulation); [`PassthroughGenerator`] degrades to retrieval-only
//! - [`VectorStore`] — named collections with threshold-filtered
//!   nearest-neighbor search; [`InMemoryVectorStore`] ships in-crate
//!
//! Capabilities are selected explicitly at construction time, so tests and
//! deployments swap implementations without touching the engine.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragcore::{InMemoryVectorStore, PassthroughGenerator, RagConfig, RagEngine};
//!
//! let engine = RagEngine::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .answer_generator(Arc::new(PassthroughGenerator))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! engine.ingest_text("Refunds are issued within 14 days.", "policy").await?;
//! let result = engine.query("How fast are refunds issued?", None, None).await?;
//! println!("{}", result.answer);
//! ```
//!
//! ## Features
//!
//! - `openai` — OpenAI-backed [`EmbeddingProvider`] and [`AnswerGenerator`]
//!   implementations over the REST API.

pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod processor;
pub mod vectorstore;

pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, ChunkMetadata, CollectionStats, HopTrace, IngestStats, IterativeQueryResult,
    QueryResult, RagStats, SearchResult,
};
pub use embedding::EmbeddingProvider;
pub use engine::{RagEngine, RagEngineBuilder};
pub use error::{RagError, Result};
pub use generation::{AnswerGenerator, PassthroughGenerator};
pub use inmemory::InMemoryVectorStore;
pub use processor::{DocumentProcessor, chunk_hash};
pub use vectorstore::{ChunkRecord, VectorStore};
