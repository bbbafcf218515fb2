//! Newline-delimited JSON response streaming
//!
//! Ollama streams generation and pull progress as one JSON object per line.
//! Response bodies arrive in arbitrary chunks, so a line may span several
//! chunks and a chunk may carry several lines; [`LineBuffer`] reassembles
//! complete lines before they are decoded.

use crate::llm::client::LlmError;
use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;

/// Reassembles newline-delimited records from arbitrary byte chunks
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns every line completed by it
    ///
    /// Returned lines do not include the trailing newline. Empty lines are
    /// dropped.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop(); // trailing newline
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Returns any unterminated trailing line
    pub(crate) fn finish(self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

/// Turns a streaming HTTP response into a stream of decoded JSON records
pub(crate) fn ndjson_stream<T>(
    response: reqwest::Response,
) -> impl Stream<Item = Result<T, LlmError>>
where
    T: DeserializeOwned,
{
    try_stream! {
        let mut lines = LineBuffer::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for line in lines.push(&chunk) {
                let record: T = serde_json::from_slice(&line)?;
                yield record;
            }
        }

        if let Some(rest) = lines.finish() {
            let record: T = serde_json::from_slice(&rest)?;
            yield record;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_line() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"{\"a\":1}\n");
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_line_spanning_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"a\"").is_empty());
        let lines = buffer.push(b":1}\n{\"b\":2}\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], b"{\"a\":1}".to_vec());
        assert_eq!(lines[1], b"{\"b\":2}".to_vec());
    }

    #[test]
    fn test_unterminated_tail_returned_by_finish() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"a\":1}").is_empty());
        assert_eq!(buffer.finish(), Some(b"{\"a\":1}".to_vec()));
    }

    #[test]
    fn test_blank_lines_dropped() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"\n\n{\"a\":1}\n\n");
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);
    }
}
