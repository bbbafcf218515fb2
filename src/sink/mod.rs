//! Document sink module for persisting extracted content
//!
//! This module handles:
//! - The [`DocumentSink`] trait the crawl engine writes through
//! - A filesystem sink mapping URLs to nested directories under the output root
//! - An in-memory sink for tests and dry runs

mod fs;
mod memory;
mod traits;

pub use fs::FsDocumentSink;
pub use memory::{MemorySink, WriteRecord};
pub use traits::{DocumentSink, SinkError, SinkPayload, SinkResult};
