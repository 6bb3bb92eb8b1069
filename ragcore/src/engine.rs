//! RAG engine orchestrator.
//!
//! [`RagEngine`] coordinates the full ingest-and-query workflow by composing
//! a [`DocumentProcessor`], an [`EmbeddingProvider`], an [`AnswerGenerator`],
//! and a [`VectorStore`]. Engines are built explicitly and passed by
//! reference or injection — there is no process-wide singleton, so tests can
//! substitute any capability.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragcore::{RagConfig, RagEngine, InMemoryVectorStore, PassthroughGenerator};
//!
//! let engine = RagEngine::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .answer_generator(Arc::new(PassthroughGenerator))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! engine.ingest_text("...", "handbook").await?;
//! let result = engine.query("How do refunds work?", None, None).await?;
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::RagConfig;
use crate::document::{
    Chunk, HopTrace, IngestStats, IterativeQueryResult, QueryResult, RagStats, SearchResult,
};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::AnswerGenerator;
use crate::processor::DocumentProcessor;
use crate::vectorstore::{ChunkRecord, VectorStore};

/// Default name for the engine's vector collection.
const DEFAULT_COLLECTION: &str = "documents";

/// System prompt used when the caller does not supply one.
const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant answering questions from a \
     knowledge base. Answer accurately based on the provided context. If the context does \
     not contain the information needed, say so clearly. Cite sources as [Source N] when \
     using information from the context.";

/// Context block used when retrieval produced nothing. The generator is
/// still called, but it is told there is nothing to ground on.
const NO_CONTEXT_NOTICE: &str = "No supporting context was found in the knowledge base for \
     this question. State clearly that no supporting context was found. Do not invent or \
     imply sources.";

/// Max characters of each source quoted back during query reformulation.
const REFORMULATION_EXCERPT_CHARS: usize = 200;

/// The RAG engine.
///
/// Owns one named vector collection and the default retrieval thresholds,
/// so callers get a stable contract regardless of store defaults. Construct
/// via [`RagEngine::builder()`].
pub struct RagEngine {
    config: RagConfig,
    collection: String,
    processor: DocumentProcessor,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    answer_generator: Arc<dyn AnswerGenerator>,
    vector_store: Arc<dyn VectorStore>,
}

impl RagEngine {
    /// Create a new [`RagEngineBuilder`].
    pub fn builder() -> RagEngineBuilder {
        RagEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest raw text under a source label: chunk, embed in one batch, upsert.
    ///
    /// Empty input is not an error; it reports zero chunks added. Chunks
    /// whose content already exists in the collection are replaced, not
    /// duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] for an empty source label and
    /// [`RagError::EmbeddingUnavailable`] if the provider fails; a batched
    /// provider failure fails the whole ingestion atomically.
    pub async fn ingest_text(&self, text: &str, source: &str) -> Result<IngestStats> {
        if source.trim().is_empty() {
            return Err(RagError::Validation("source label must not be empty".to_string()));
        }

        let chunks = self.processor.process_text(text, source);
        self.ingest_chunks(chunks, source).await
    }

    /// Ingest a document from disk.
    ///
    /// Files with a `.pdf` extension are extracted page by page; anything
    /// else is read as UTF-8 text with the path as its source label.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] for missing, unreadable, or
    /// unparseable files.
    pub async fn ingest_document(&self, path: impl AsRef<Path>) -> Result<IngestStats> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let chunks = if is_pdf {
            self.processor.process_pdf(path)?
        } else {
            let text = std::fs::read_to_string(path).map_err(|e| {
                RagError::ChunkingError(format!("failed to read '{source}': {e}"))
            })?;
            self.processor.process_text(&text, &source)
        };

        self.ingest_chunks(chunks, &source).await
    }

    async fn ingest_chunks(&self, chunks: Vec<Chunk>, source: &str) -> Result<IngestStats> {
        if chunks.is_empty() {
            let stats = self.vector_store.stats(&self.collection).await?;
            info!(source, chunks_added = 0usize, "ingested nothing (empty input)");
            return Ok(IngestStats {
                source: source.to_string(),
                chunks_added: 0,
                collection_size: stats.total_chunks,
            });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await?;

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord { chunk, embedding })
            .collect();

        self.ensure_collection().await?;
        self.vector_store.upsert(&self.collection, &records).await?;

        let stats = self.vector_store.stats(&self.collection).await?;
        info!(
            source,
            chunks_added = records.len(),
            collection_size = stats.total_chunks,
            "ingested document"
        );

        Ok(IngestStats {
            source: source.to_string(),
            chunks_added: records.len(),
            collection_size: stats.total_chunks,
        })
    }

    /// Embed a query and return the most similar chunks.
    ///
    /// `top_k` and `min_similarity` default to the configured values; the
    /// engine owns those defaults. Results are sorted by descending
    /// similarity and never include scores below the threshold. An empty or
    /// missing collection yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] for an empty query and
    /// [`RagError::EmbeddingUnavailable`] if the provider fails.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }

        let top_k = top_k.unwrap_or(self.config.top_k);
        let threshold = min_similarity.unwrap_or(self.config.similarity_threshold);

        let embedding = self.embedding_provider.embed(query).await?;
        let results = self.vector_store.search(&self.collection, &embedding, top_k).await?;

        let filtered: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(result_count = filtered.len(), "search completed");
        Ok(filtered)
    }

    /// Answer a question in a single retrieval hop.
    ///
    /// Retrieves `top_k` chunks, assembles a `[Source N]`-attributed context,
    /// and asks the generator for an answer grounded in it. When retrieval
    /// finds nothing the generator is still called, with a prompt that
    /// instructs it to state that no supporting context was found — sourcing
    /// is never fabricated.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationUnavailable`] if the generator fails.
    pub async fn query(
        &self,
        question: &str,
        top_k: Option<usize>,
        system_prompt: Option<&str>,
    ) -> Result<QueryResult> {
        let sources = self.search(question, top_k, None).await?;
        let prompt = build_prompt(question, &sources, system_prompt);
        let answer = self.answer_generator.generate(&prompt).await?;

        info!(source_count = sources.len(), "query answered");
        Ok(QueryResult { answer, sources })
    }

    /// Answer a question through iterative multi-hop retrieval.
    ///
    /// Each round retrieves for the current sub-query and merges results
    /// into an accumulated set deduplicated by `(source, chunk_index)`. The
    /// loop ends early once at least `min_results` accumulated sources score
    /// at or above `sufficiency_threshold`; otherwise the generator is asked
    /// for a reformulated sub-query targeting the missing information and
    /// the next round begins. `max_iterations` is a hard cap on retrieval
    /// rounds — at most two external calls per round plus one final
    /// generation. A reformulation failure stops hopping and degrades to a
    /// best-effort answer from what was accumulated. Exit conditions are
    /// checked only at hop boundaries, so cancellation takes effect between
    /// hops, never mid-call.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] if `max_iterations` is `Some(0)`
    /// and [`RagError::GenerationUnavailable`] only if the final answer
    /// generation fails.
    pub async fn iterative_query(
        &self,
        question: &str,
        max_iterations: Option<usize>,
    ) -> Result<IterativeQueryResult> {
        let max_iterations = max_iterations.unwrap_or(self.config.max_iterations);
        if max_iterations == 0 {
            return Err(RagError::Validation(
                "max_iterations must be greater than zero".to_string(),
            ));
        }

        let mut accumulated: Vec<SearchResult> = Vec::new();
        let mut seen: HashSet<(String, usize)> = HashSet::new();
        let mut queries_issued = vec![question.to_string()];
        let mut trace = Vec::new();
        let mut current = question.to_string();
        let mut iterations_used = 0;

        for iteration in 1..=max_iterations {
            let results = self.search(&current, None, None).await?;
            iterations_used = iteration;

            let mut new_sources = 0;
            let results_found = results.len();
            for result in results {
                let key = (result.metadata.source.clone(), result.metadata.chunk_index);
                if seen.insert(key) {
                    accumulated.push(result);
                    new_sources += 1;
                }
            }
            trace.push(HopTrace { iteration, query: current.clone(), results_found, new_sources });

            if self.is_sufficient(&accumulated) || iteration == max_iterations {
                break;
            }

            match self.reformulate(question, &queries_issued, &accumulated).await {
                Ok(next) if !next.trim().is_empty() && next != current => {
                    queries_issued.push(next.clone());
                    current = next;
                }
                Ok(_) => break,
                Err(e) => {
                    warn!(error = %e, "reformulation failed; answering from accumulated sources");
                    break;
                }
            }
        }

        accumulated
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let prompt = build_prompt(question, &accumulated, None);
        let answer = self.answer_generator.generate(&prompt).await?;

        info!(
            iterations_used,
            source_count = accumulated.len(),
            query_count = queries_issued.len(),
            "iterative query answered"
        );

        Ok(IterativeQueryResult {
            answer,
            sources: accumulated,
            iterations_used,
            queries_issued,
            trace,
        })
    }

    /// Report collection statistics together with the active configuration.
    pub async fn stats(&self) -> Result<RagStats> {
        self.ensure_collection().await?;
        let collection = self.vector_store.stats(&self.collection).await?;
        Ok(RagStats { collection, config: self.config.clone() })
    }

    /// Drop every stored chunk by deleting and recreating the collection.
    pub async fn clear(&self) -> Result<()> {
        self.vector_store.delete_collection(&self.collection).await?;
        self.ensure_collection().await?;
        info!(collection = %self.collection, "cleared collection");
        Ok(())
    }

    async fn ensure_collection(&self) -> Result<()> {
        self.vector_store
            .create_collection(&self.collection, self.embedding_provider.dimensions())
            .await
    }

    /// Accumulated sources suffice once enough of them clear the
    /// sufficiency threshold.
    fn is_sufficient(&self, sources: &[SearchResult]) -> bool {
        let strong = sources.iter().filter(|s| s.score >= self.config.sufficiency_threshold).count();
        strong >= self.config.min_results
    }

    /// Ask the generator for a refined sub-query targeting what is missing.
    async fn reformulate(
        &self,
        question: &str,
        queries_issued: &[String],
        accumulated: &[SearchResult],
    ) -> Result<String> {
        let excerpts = if accumulated.is_empty() {
            "(nothing retrieved yet)".to_string()
        } else {
            accumulated
                .iter()
                .map(|s| {
                    let excerpt: String =
                        s.content.chars().take(REFORMULATION_EXCERPT_CHARS).collect();
                    format!("- {excerpt}")
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let prompt = format!(
            "You are refining a knowledge-base search.\n\
             Original question: {question}\n\
             Queries already issued: {queries}\n\
             Context retrieved so far:\n{excerpts}\n\n\
             The retrieved context is not yet sufficient to answer the original question. \
             Reply with a single refined search query targeting the missing information, \
             and nothing else.",
            queries = queries_issued.join("; "),
        );

        let response = self.answer_generator.generate(&prompt).await?;
        Ok(response.lines().next().unwrap_or_default().trim().trim_matches('"').to_string())
    }
}

/// Assemble the grounding prompt: system instructions, `[Source N]`
/// context, then the question.
fn build_prompt(question: &str, sources: &[SearchResult], system_prompt: Option<&str>) -> String {
    let system = system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let context = if sources.is_empty() {
        NO_CONTEXT_NOTICE.to_string()
    } else {
        sources
            .iter()
            .enumerate()
            .map(|(idx, s)| format!("[Source {}] {}", idx + 1, s.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!("{system}\n\nContext:\n{context}\n\nQuestion: {question}")
}

/// Builder for constructing a [`RagEngine`].
///
/// `config` and `collection` are optional (defaults apply); the three
/// capabilities are required.
#[derive(Default)]
pub struct RagEngineBuilder {
    config: Option<RagConfig>,
    collection: Option<String>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    answer_generator: Option<Arc<dyn AnswerGenerator>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl RagEngineBuilder {
    /// Set the engine configuration. Defaults to [`RagConfig::default()`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the vector collection name. Defaults to `"documents"`.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the answer generator.
    pub fn answer_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.answer_generator = Some(generator);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`RagEngine`], validating that all required capabilities are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required capability is missing.
    pub fn build(self) -> Result<RagEngine> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let answer_generator = self
            .answer_generator
            .ok_or_else(|| RagError::ConfigError("answer_generator is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        let processor = DocumentProcessor::new(config.chunk_size, config.chunk_overlap);

        Ok(RagEngine {
            collection: self.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            config,
            processor,
            embedding_provider,
            answer_generator,
            vector_store,
        })
    }
}
