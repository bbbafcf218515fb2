//! Retrieval-augmented query service
//!
//! Answers a question by retrieving the single best-matching stored
//! document and streaming a generation request conditioned on it. The
//! prompt has a fixed shape; ranking across multiple passages is out of
//! scope (retrieval is always top-1).

use crate::config::LlmConfig;
use crate::llm::{GenerateChunk, LlmError, OllamaClient};
use crate::store::{EmbeddingStore, StoreError};
use crate::MagpieError;
use futures_util::Stream;
use std::sync::Arc;

/// Builds the generation prompt from the retrieved passage and the question
pub fn build_prompt(data: &str, question: &str) -> String {
    format!(
        "Using this data: {}. Respond to the prompt: {}",
        data, question
    )
}

/// Service that answers questions against the embedding store
pub struct QueryService {
    client: Arc<OllamaClient>,
    store: EmbeddingStore,
    generation_model: String,
}

impl QueryService {
    /// Creates a query service sharing the process's backend client
    pub fn new(client: Arc<OllamaClient>, llm_config: &LlmConfig) -> Self {
        let store = EmbeddingStore::new(Arc::clone(&client), llm_config.embedding_model.clone());

        Self {
            client,
            store,
            generation_model: llm_config.generation_model.clone(),
        }
    }

    /// The underlying embedding store
    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    /// Embeds one document into the named collection
    ///
    /// Returns true if the document was stored (false when the backend
    /// could not embed it).
    pub async fn add_document(&mut self, text: &str, collection: &str) -> Result<bool, StoreError> {
        let texts = [text.to_string()];
        let stored = self.store.add_documents(&texts, collection).await?;
        Ok(stored == 1)
    }

    /// Embeds a batch of documents into the named collection
    pub async fn add_documents(
        &mut self,
        texts: &[String],
        collection: &str,
    ) -> Result<usize, StoreError> {
        self.store.add_documents(texts, collection).await
    }

    /// Answers a question against the named collection
    ///
    /// Performs a fresh retrieval and generation round trip on every call;
    /// the returned stream is finite and not restartable, and generation is
    /// non-deterministic, so repeated calls may answer differently.
    ///
    /// # Errors
    ///
    /// * [`StoreError::CollectionNotFound`] - Nothing has been embedded into
    ///   the collection
    /// * [`LlmError`] - The backend rejected the generation request
    pub async fn answer(
        &self,
        question: &str,
        collection: &str,
    ) -> Result<impl Stream<Item = Result<GenerateChunk, LlmError>>, MagpieError> {
        let retrieved = self.store.query_best(question, collection).await?;

        tracing::debug!(
            "Retrieved a {}-byte passage from collection '{}'",
            retrieved.len(),
            collection
        );

        let prompt = build_prompt(&retrieved, question);
        let stream = self.client.generate(&self.generation_model, &prompt).await?;

        Ok(stream)
    }
}
