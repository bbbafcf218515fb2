//! Configuration module for Magpie
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. The configuration covers backend settings only (Ollama connection,
//! model names, WebDriver endpoint, fetch timeout, output root); crawl and
//! query arguments are passed literally on the command line.
//!
//! # Example
//!
//! ```no_run
//! use magpie::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Ollama endpoint: {}", config.llm.base_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerSettings, LlmConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
