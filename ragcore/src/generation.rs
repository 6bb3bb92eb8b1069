//! Answer generator trait and its null implementation.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps a prompt to generated text.
///
/// The engine reuses one generator for both answer synthesis and for
/// producing reformulated sub-queries during multi-hop retrieval.
/// Implementations are chosen at engine construction time — there is no
/// implicit fallback — and must enforce a request timeout, surfacing
/// failures as [`RagError::GenerationUnavailable`](crate::error::RagError::GenerationUnavailable).
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// A generator that returns the prompt unchanged.
///
/// Degrades queries to retrieval-only mode: the "answer" is the assembled
/// grounding prompt itself, excerpts included. Also the deterministic choice
/// for tests that assert on prompt construction.
///
/// # Example
///
/// ```rust,ignore
/// use ragcore::PassthroughGenerator;
///
/// let generator = PassthroughGenerator;
/// let answer = generator.generate("Context:\n...").await?;
/// // answer == "Context:\n..."
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughGenerator;

#[async_trait]
impl AnswerGenerator for PassthroughGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}
