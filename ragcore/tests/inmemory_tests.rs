//! Property and behavior tests for the in-memory vector store.

use std::collections::HashMap;

use proptest::prelude::*;
use ragcore::RagError;
use ragcore::document::{Chunk, ChunkMetadata};
use ragcore::inmemory::InMemoryVectorStore;
use ragcore::processor::chunk_hash;
use ragcore::vectorstore::{ChunkRecord, VectorStore};

fn record(content: &str, chunk_index: usize, embedding: Vec<f32>) -> ChunkRecord {
    ChunkRecord {
        chunk: Chunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                source: "doc".to_string(),
                chunk_index,
                total_chunks: 1,
                content_hash: chunk_hash(content),
            },
        },
        embedding,
    }
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a record with random content and a normalized embedding.
fn arb_record(dim: usize) -> impl Strategy<Value = ChunkRecord> {
    ("[a-z]{3,12}", arb_normalized_embedding(dim))
        .prop_map(|(content, embedding)| record(&content, 0, embedding))
}

/// For any set of stored records, search results are ordered by descending
/// similarity, bounded by `top_k`, and every score stays within `[0, 1]`.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_bounded_and_normalized(
            records in proptest::collection::vec(arb_record(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();

                // Identical contents share a hash and collapse on upsert.
                let mut deduped: HashMap<String, ChunkRecord> = HashMap::new();
                for r in &records {
                    deduped.insert(r.chunk.metadata.content_hash.clone(), r.clone());
                }
                let count = deduped.len();

                store.upsert("test", &records).await.unwrap();
                let results = store.search("test", &query, top_k).await.unwrap();
                (results, count)
            });

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= unique_count);

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
            for result in &results {
                prop_assert!((0.0..=1.0).contains(&result.score));
            }
        }
    }
}

#[tokio::test]
async fn search_on_missing_collection_is_empty() {
    let store = InMemoryVectorStore::new();
    let results = store.search("nope", &[1.0, 0.0], 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn upsert_into_missing_collection_fails() {
    let store = InMemoryVectorStore::new();
    let err = store.upsert("nope", &[record("a", 0, vec![1.0, 0.0])]).await.unwrap_err();
    assert!(matches!(err, RagError::VectorStoreError { .. }));
}

#[tokio::test]
async fn upsert_rejects_dimension_mismatch() {
    let store = InMemoryVectorStore::new();
    store.create_collection("docs", 3).await.unwrap();
    let err = store.upsert("docs", &[record("a", 0, vec![1.0, 0.0])]).await.unwrap_err();
    assert!(matches!(err, RagError::VectorStoreError { .. }));
}

#[tokio::test]
async fn identical_content_collapses_to_one_entry() {
    let store = InMemoryVectorStore::new();
    store.create_collection("docs", 2).await.unwrap();
    store
        .upsert("docs", &[record("same", 0, vec![1.0, 0.0]), record("same", 1, vec![0.0, 1.0])])
        .await
        .unwrap();

    let stats = store.stats("docs").await.unwrap();
    assert_eq!(stats.total_chunks, 1);
}

#[tokio::test]
async fn delete_collection_drops_all_data() {
    let store = InMemoryVectorStore::new();
    store.create_collection("docs", 2).await.unwrap();
    store.upsert("docs", &[record("a", 0, vec![1.0, 0.0])]).await.unwrap();
    store.delete_collection("docs").await.unwrap();

    let stats = store.stats("docs").await.unwrap();
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.embedding_dimension, 0);
}

#[tokio::test]
async fn stats_report_dimensions_and_count() {
    let store = InMemoryVectorStore::new();
    store.create_collection("docs", 2).await.unwrap();
    store
        .upsert("docs", &[record("a", 0, vec![1.0, 0.0]), record("b", 1, vec![0.0, 1.0])])
        .await
        .unwrap();

    let stats = store.stats("docs").await.unwrap();
    assert_eq!(stats.total_chunks, 2);
    assert_eq!(stats.collection_name, "docs");
    assert_eq!(stats.embedding_dimension, 2);
}
