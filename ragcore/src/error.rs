//! Error types for the `ragcore` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// Operational failures (provider down, timeout, unreadable document) are
/// returned as values so callers can pattern-match on the failure category.
/// Invalid configuration is rejected at construction time via
/// [`ConfigError`](RagError::ConfigError).
#[derive(Debug, Error)]
pub enum RagError {
    /// Empty or malformed caller input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The embedding provider was unreachable, timed out, or rejected the request.
    #[error("Embedding provider unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The answer generator was unreachable, timed out, or rejected the request.
    #[error("Answer generator unavailable ({provider}): {message}")]
    GenerationUnavailable {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A document could not be read or parsed into chunks.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
