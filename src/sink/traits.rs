//! Document sink trait and error types
//!
//! This module defines the trait interface the crawl engine persists
//! extracted content through, and the associated payload and error types.

use crate::content::ContentKind;
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write document: {0}")]
    Write(String),

    #[error("Cannot persist content kind {0}: no output extension")]
    UnsupportedKind(ContentKind),

    #[error("Cannot derive a file name from URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Content handed to a sink: extracted text or raw response bytes
#[derive(Debug, Clone)]
pub enum SinkPayload {
    /// Extracted, header-prefixed text (HTML pages)
    Text(String),

    /// Raw response body (PDF and DOCX documents)
    Binary(Vec<u8>),
}

impl SinkPayload {
    /// Payload size in bytes
    pub fn len(&self) -> u64 {
        match self {
            Self::Text(text) => text.len() as u64,
            Self::Binary(bytes) => bytes.len() as u64,
        }
    }

    /// Returns true if the payload carries no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for document sink implementations
///
/// The engine calls `write` once per visited URL with non-empty content.
/// The returned byte count is what the engine records in its visited ledger,
/// so implementations must report what they actually wrote.
pub trait DocumentSink {
    /// Persists one document
    ///
    /// # Arguments
    ///
    /// * `collection` - Logical namespace (one directory per collection)
    /// * `url` - The source URL the content came from
    /// * `payload` - Extracted text or raw bytes
    /// * `kind` - The classified content kind (drives the file extension)
    /// * `depth` - Link-hops from the seed at which the URL was found
    ///
    /// # Returns
    ///
    /// The number of bytes written
    fn write(
        &self,
        collection: &str,
        url: &str,
        payload: SinkPayload,
        kind: ContentKind,
        depth: u32,
    ) -> SinkResult<u64>;
}

impl<T: DocumentSink + ?Sized> DocumentSink for &T {
    fn write(
        &self,
        collection: &str,
        url: &str,
        payload: SinkPayload,
        kind: ContentKind,
        depth: u32,
    ) -> SinkResult<u64> {
        (**self).write(collection, url, payload, kind, depth)
    }
}
