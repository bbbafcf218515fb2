//! In-memory vector index with named collections
//!
//! Each collection maps strictly increasing integer ids to
//! `(embedding, document text)` pairs. A distinguished `"default"`
//! collection aggregates every document embedded into any named collection,
//! so an unscoped query can search everything at once.
//!
//! No internal locking is provided: the process model assumes at most one
//! crawl or query operation touches a given collection at a time, so
//! serializing concurrent writers is a caller responsibility.

use crate::llm::{LlmError, OllamaClient};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Name of the aggregating collection every insert is mirrored into
pub const DEFAULT_COLLECTION: &str = "default";

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Collection not found or empty: {0}")]
    CollectionNotFound(String),

    #[error("Embedding backend error: {0}")]
    Embedding(#[from] LlmError),

    #[error("Backend returned no embedding for the question")]
    QuestionNotEmbeddable,
}

/// One embedded document
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Position in the collection's insertion order; never reused
    pub id: u64,

    /// Embedding vector
    pub embedding: Vec<f32>,

    /// The stored document text
    pub text: String,
}

/// A named, independently countered set of embedded documents
#[derive(Debug, Default)]
pub struct Collection {
    next_id: u64,
    documents: Vec<StoredDocument>,
}

impl Collection {
    /// Inserts a document under the next counter value and returns its id
    fn insert(&mut self, embedding: Vec<f32>, text: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.documents.push(StoredDocument {
            id,
            embedding,
            text,
        });
        id
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The stored documents in insertion order
    pub fn documents(&self) -> &[StoredDocument] {
        &self.documents
    }

    /// Returns the stored document closest to the query embedding
    fn nearest(&self, query: &[f32]) -> Option<&StoredDocument> {
        self.documents
            .iter()
            .map(|doc| (cosine_similarity(query, &doc.embedding), doc))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, doc)| doc)
    }
}

/// The process's vector index, bound to one embedding model
pub struct EmbeddingStore {
    client: Arc<OllamaClient>,
    embedding_model: String,
    collections: HashMap<String, Collection>,
}

impl EmbeddingStore {
    /// Creates an empty store
    ///
    /// The `"default"` collection exists from the start with its counter at
    /// zero; every other collection is created lazily on first insert.
    pub fn new(client: Arc<OllamaClient>, embedding_model: impl Into<String>) -> Self {
        let mut collections = HashMap::new();
        collections.insert(DEFAULT_COLLECTION.to_string(), Collection::default());

        Self {
            client,
            embedding_model: embedding_model.into(),
            collections,
        }
    }

    /// Computes an embedding for the given text
    ///
    /// An empty vector means the backend could not embed the input.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.client.embeddings(&self.embedding_model, text).await
    }

    /// Embeds and stores a batch of texts into the named collection
    ///
    /// Texts whose embedding comes back empty are skipped before any index
    /// mutation (they consume no id). Returns the number of texts actually
    /// stored.
    pub async fn add_documents(
        &mut self,
        texts: &[String],
        collection: &str,
    ) -> Result<usize, StoreError> {
        let mut stored = 0;

        for text in texts {
            let embedding = self.embed(text).await?;

            if embedding.is_empty() {
                tracing::warn!(
                    "Skipping unembeddable document ({} bytes) for collection '{}'",
                    text.len(),
                    collection
                );
                continue;
            }

            self.insert(collection, embedding, text.clone());
            stored += 1;
        }

        Ok(stored)
    }

    /// Inserts an already-embedded document
    ///
    /// Creates the collection lazily and mirrors the document into
    /// `"default"` (with `"default"`'s own counter) unless the target
    /// already is `"default"`. Returns the id assigned in the target
    /// collection.
    pub fn insert(&mut self, collection: &str, embedding: Vec<f32>, text: String) -> u64 {
        let id = self
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(embedding.clone(), text.clone());

        if collection != DEFAULT_COLLECTION {
            self.collections
                .entry(DEFAULT_COLLECTION.to_string())
                .or_default()
                .insert(embedding, text);
        }

        id
    }

    /// Returns the single best-matching stored document text for a question
    ///
    /// # Errors
    ///
    /// * [`StoreError::CollectionNotFound`] - The collection has never been
    ///   created or holds no documents
    /// * [`StoreError::QuestionNotEmbeddable`] - The backend returned no
    ///   vector for the question
    pub async fn query_best(
        &self,
        question: &str,
        collection: &str,
    ) -> Result<String, StoreError> {
        let target = self
            .collections
            .get(collection)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let query = self.embed(question).await?;
        if query.is_empty() {
            return Err(StoreError::QuestionNotEmbeddable);
        }

        // Non-empty collection, so a nearest document always exists
        let best = target
            .nearest(&query)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        Ok(best.text.clone())
    }

    /// Looks up a collection by name
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }
}

/// Cosine similarity between two vectors
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    fn test_store() -> EmbeddingStore {
        let client = Arc::new(OllamaClient::new(&LlmConfig::default()).unwrap());
        EmbeddingStore::new(client, "all-minilm")
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_ids_strictly_increasing_from_zero() {
        let mut store = test_store();
        for i in 0..5 {
            let id = store.insert("reports", vec![i as f32, 1.0], format!("doc {}", i));
            assert_eq!(id, i);
        }

        let ids: Vec<u64> = store
            .collection("reports")
            .unwrap()
            .documents()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_mirrors_into_default() {
        let mut store = test_store();
        store.insert("reports", vec![1.0, 0.0], "a".to_string());

        assert_eq!(store.collection("reports").unwrap().len(), 1);
        assert_eq!(store.collection(DEFAULT_COLLECTION).unwrap().len(), 1);
    }

    #[test]
    fn test_default_insert_not_double_counted() {
        let mut store = test_store();
        store.insert(DEFAULT_COLLECTION, vec![1.0, 0.0], "a".to_string());

        assert_eq!(store.collection(DEFAULT_COLLECTION).unwrap().len(), 1);
    }

    #[test]
    fn test_default_counter_independent() {
        let mut store = test_store();
        store.insert("reports", vec![1.0, 0.0], "a".to_string());
        store.insert("notes", vec![0.0, 1.0], "b".to_string());

        // Each named collection starts its own counter at 0
        assert_eq!(store.collection("reports").unwrap().documents()[0].id, 0);
        assert_eq!(store.collection("notes").unwrap().documents()[0].id, 0);

        // The default mirror assigned 0 and 1
        let default_ids: Vec<u64> = store
            .collection(DEFAULT_COLLECTION)
            .unwrap()
            .documents()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(default_ids, vec![0, 1]);
    }

    #[test]
    fn test_nearest_picks_closest() {
        let mut collection = Collection::default();
        collection.insert(vec![1.0, 0.0], "east".to_string());
        collection.insert(vec![0.0, 1.0], "north".to_string());

        let best = collection.nearest(&[0.1, 0.9]).unwrap();
        assert_eq!(best.text, "north");
    }

    #[tokio::test]
    async fn test_query_best_missing_collection() {
        let store = test_store();
        let result = store.query_best("anything", "nonexistent").await;
        assert!(matches!(result, Err(StoreError::CollectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_query_best_empty_default_collection() {
        let store = test_store();
        // "default" exists from construction but is empty
        let result = store.query_best("anything", DEFAULT_COLLECTION).await;
        assert!(matches!(result, Err(StoreError::CollectionNotFound(_))));
    }
}
