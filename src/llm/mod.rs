//! Ollama backend client
//!
//! This module wraps the Ollama HTTP API used by the embedding store and
//! the query service:
//! - `/api/embeddings` for document and question vectors
//! - `/api/generate` and `/api/chat` for streamed generation
//! - `/api/pull` for model downloads with incremental progress
//! - `/api/tags` for listing installed models
//!
//! One client (one connection pool) exists per process; it is constructed
//! once at startup and passed explicitly to everything that needs it.

mod client;
mod ndjson;

pub use client::{
    ChatChunk, ChatMessage, GenerateChunk, LlmError, ModelInfo, OllamaClient, PullEvent,
};
