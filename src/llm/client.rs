//! Ollama HTTP API client
//!
//! One [`OllamaClient`] exists per process. It is constructed once at
//! startup, wrapped in an `Arc`, and passed explicitly to the embedding
//! store and the query service, so ownership of the single backend
//! connection pool stays visible in the call graph.

use crate::config::LlmConfig;
use crate::llm::ndjson::ndjson_stream;
use futures_util::Stream;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from the Ollama backend boundary
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend returned status {status}: {message}")]
    Backend { status: u16, message: String },
}

/// One installed model, as reported by `/api/tags`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,

    /// Model size in bytes
    #[serde(default)]
    pub size: u64,
}

/// One fragment of a streamed `/api/generate` response
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateChunk {
    /// Generated text fragment
    #[serde(default)]
    pub response: String,

    /// True on the final chunk of the stream
    #[serde(default)]
    pub done: bool,
}

/// One message fragment of a streamed `/api/chat` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: String,
}

/// One fragment of a streamed `/api/chat` response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: ChatMessage,

    #[serde(default)]
    pub done: bool,
}

/// One progress record of a streamed `/api/pull` response
#[derive(Debug, Clone, Deserialize)]
pub struct PullEvent {
    /// Human-readable phase, e.g. "pulling manifest" or "success"
    #[serde(default)]
    pub status: String,

    /// Layer digest the progress numbers refer to
    pub digest: Option<String>,

    /// Total bytes of the current layer
    pub total: Option<u64>,

    /// Bytes downloaded so far for the current layer
    pub completed: Option<u64>,
}

impl PullEvent {
    /// Percentage complete of the current layer, when the event carries
    /// progress numbers
    pub fn percentage(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some(completed as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// Response envelope of `/api/tags`
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Client for a single Ollama server
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Builds the process's client from the LLM configuration
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::from_base_url(config.base_url())
    }

    /// Builds a client against an explicit base URL
    ///
    /// Generation requests can legitimately run for minutes, so only the
    /// connection phase is bounded.
    pub fn from_base_url(base_url: impl Into<String>) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Posts a JSON body and surfaces non-2xx statuses as [`LlmError::Backend`]
    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Computes an embedding vector for the given text
    ///
    /// Returns an empty vector when the backend cannot produce an embedding
    /// (the response omits the `embedding` key). Callers must skip storing
    /// such texts rather than index a degenerate entry.
    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Vec<f32>, LlmError> {
        let response = self
            .post(
                "/api/embeddings",
                serde_json::json!({ "model": model, "prompt": prompt }),
            )
            .await?;

        let value: serde_json::Value = response.json().await?;

        match value.get("embedding").and_then(|v| v.as_array()) {
            Some(values) => Ok(values
                .iter()
                .filter_map(|v| v.as_f64())
                .map(|v| v as f32)
                .collect()),
            None => {
                tracing::warn!("Backend returned no embedding for a {}-byte text", prompt.len());
                Ok(Vec::new())
            }
        }
    }

    /// Issues a streaming generation request
    ///
    /// The returned stream is finite and must be drained (or dropped) before
    /// the next request against this client.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<impl Stream<Item = Result<GenerateChunk, LlmError>>, LlmError> {
        let response = self
            .post(
                "/api/generate",
                serde_json::json!({ "model": model, "prompt": prompt, "stream": true }),
            )
            .await?;

        Ok(ndjson_stream(response))
    }

    /// Issues a streaming single-turn chat request
    pub async fn chat(
        &self,
        model: &str,
        text: &str,
    ) -> Result<impl Stream<Item = Result<ChatChunk, LlmError>>, LlmError> {
        let response = self
            .post(
                "/api/chat",
                serde_json::json!({
                    "model": model,
                    "messages": [{ "role": "user", "content": text }],
                    "stream": true,
                }),
            )
            .await?;

        Ok(ndjson_stream(response))
    }

    /// Pulls a model, streaming incremental progress
    ///
    /// Pulling an already-present model is a fast no-op: the stream reports
    /// success without download phases.
    pub async fn pull(
        &self,
        model: &str,
    ) -> Result<impl Stream<Item = Result<PullEvent, LlmError>>, LlmError> {
        let response = self
            .post(
                "/api/pull",
                serde_json::json!({ "name": model, "stream": true }),
            )
            .await?;

        Ok(ndjson_stream(response))
    }

    /// Lists the models installed on the backend
    ///
    /// A backend with no models reports an empty list.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models)
    }
}
