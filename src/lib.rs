//! Magpie: web ingestion and retrieval-augmented query
//!
//! This crate crawls a web origin into a local document tree, embeds the
//! extracted text into named vector collections, and answers natural-language
//! questions by retrieving the best-matching document and streaming a
//! generation request conditioned on it.

pub mod config;
pub mod content;
pub mod crawler;
pub mod llm;
pub mod query;
pub mod sink;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Magpie operations
#[derive(Debug, Error)]
pub enum MagpieError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Render error: {0}")]
    Render(#[from] crawler::RenderError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Magpie operations
pub type Result<T> = std::result::Result<T, MagpieError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use content::ContentKind;
pub use crawler::{CrawlConfig, CrawlEngine, CrawlReport};
pub use llm::OllamaClient;
pub use query::QueryService;
pub use store::EmbeddingStore;
