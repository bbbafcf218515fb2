//! In-memory document sink
//!
//! Records every write without touching the filesystem. Used by integration
//! tests and for dry runs where only the visited ledger matters.

use crate::content::ContentKind;
use crate::sink::traits::{DocumentSink, SinkError, SinkPayload, SinkResult};
use std::sync::Mutex;

/// One recorded write
#[derive(Debug, Clone)]
pub struct WriteRecord {
    pub collection: String,
    pub url: String,
    pub kind: ContentKind,
    pub depth: u32,
    /// Byte length of the payload
    pub len: u64,
    /// Text content, when the payload was text
    pub text: Option<String>,
}

/// Document sink that keeps all writes in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<WriteRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded writes
    pub fn records(&self) -> Vec<WriteRecord> {
        self.records.lock().expect("sink lock poisoned").clone()
    }

    /// Number of recorded writes
    pub fn len(&self) -> usize {
        self.records.lock().expect("sink lock poisoned").len()
    }

    /// Returns true if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentSink for MemorySink {
    fn write(
        &self,
        collection: &str,
        url: &str,
        payload: SinkPayload,
        kind: ContentKind,
        depth: u32,
    ) -> SinkResult<u64> {
        if kind.extension().is_none() {
            return Err(SinkError::UnsupportedKind(kind));
        }

        let len = payload.len();
        let text = match payload {
            SinkPayload::Text(text) => Some(text),
            SinkPayload::Binary(_) => None,
        };

        self.records
            .lock()
            .expect("sink lock poisoned")
            .push(WriteRecord {
                collection: collection.to_string(),
                url: url.to_string(),
                kind,
                depth,
                len,
                text,
            });

        Ok(len)
    }
}
