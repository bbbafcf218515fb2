//! Filesystem document sink
//!
//! Maps URLs to nested directories under the output root. For
//! `https://www.example.com/page/guide/help` in collection `example.com`,
//! the extracted text lands at `web_docs/example.com/page/guide/help.md`.

use crate::content::ContentKind;
use crate::sink::traits::{DocumentSink, SinkError, SinkPayload, SinkResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Characters that are not allowed in directory or file names
const RESERVED_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Document sink that writes one file per URL under a root directory
#[derive(Debug, Clone)]
pub struct FsDocumentSink {
    root: PathBuf,
}

impl FsDocumentSink {
    /// Creates a sink rooted at the given directory
    ///
    /// The directory is created on first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The sink's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSink for FsDocumentSink {
    fn write(
        &self,
        collection: &str,
        url: &str,
        payload: SinkPayload,
        kind: ContentKind,
        depth: u32,
    ) -> SinkResult<u64> {
        let extension = kind
            .extension()
            .ok_or(SinkError::UnsupportedKind(kind))?;

        let segments = url_to_segments(url);
        let (file_segment, dir_segments) = segments
            .split_last()
            .ok_or_else(|| SinkError::InvalidUrl(url.to_string()))?;

        let file_name = sanitize_component(file_segment);
        if file_name.is_empty() {
            return Err(SinkError::InvalidUrl(url.to_string()));
        }

        let mut dir = self.root.join(sanitize_component(collection));
        for segment in dir_segments {
            let component = sanitize_component(segment);
            if component.is_empty() {
                continue;
            }
            dir = dir.join(component);
        }
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.{}", file_name, extension));
        let written = match payload {
            SinkPayload::Text(text) => {
                fs::write(&path, text.as_bytes())?;
                text.len() as u64
            }
            SinkPayload::Binary(bytes) => {
                fs::write(&path, &bytes)?;
                bytes.len() as u64
            }
        };

        tracing::debug!(
            "Wrote {} bytes for {} (depth {}) to {}",
            written,
            url,
            depth,
            path.display()
        );

        Ok(written)
    }
}

/// Splits a URL into path segments after stripping scheme and `www.` prefix
fn url_to_segments(url: &str) -> Vec<&str> {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let stripped = stripped.strip_prefix("www.").unwrap_or(stripped);

    stripped.split('/').filter(|s| !s.is_empty()).collect()
}

/// Ensures a URL path segment is valid as a directory or file name
///
/// Removes filesystem-reserved characters and all whitespace.
fn sanitize_component(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| !RESERVED_CHARS.contains(c) && !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_removes_reserved_chars() {
        assert_eq!(sanitize_component(r#"a\b/c:d*e?f"g<h>i|j"#), "abcdefghij");
    }

    #[test]
    fn test_sanitize_removes_whitespace() {
        assert_eq!(sanitize_component("  hello world "), "helloworld");
    }

    #[test]
    fn test_segments_strip_scheme_and_www() {
        assert_eq!(
            url_to_segments("https://www.example.com/page/guide"),
            vec!["example.com", "page", "guide"]
        );
    }

    #[test]
    fn test_segments_host_only() {
        assert_eq!(url_to_segments("https://example.com"), vec!["example.com"]);
    }

    #[test]
    fn test_write_text_creates_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let sink = FsDocumentSink::new(dir.path());

        let written = sink
            .write(
                "example.com",
                "https://www.example.com/page/guide/help",
                SinkPayload::Text("hello".to_string()),
                ContentKind::Html,
                1,
            )
            .unwrap();

        assert_eq!(written, 5);
        let expected = dir
            .path()
            .join("example.com")
            .join("example.com")
            .join("page")
            .join("guide")
            .join("help.md");
        assert_eq!(fs::read_to_string(expected).unwrap(), "hello");
    }

    #[test]
    fn test_write_binary_uses_kind_extension() {
        let dir = TempDir::new().unwrap();
        let sink = FsDocumentSink::new(dir.path());

        let written = sink
            .write(
                "example.com",
                "https://example.com/report",
                SinkPayload::Binary(vec![1, 2, 3, 4]),
                ContentKind::Pdf,
                0,
            )
            .unwrap();

        assert_eq!(written, 4);
        let expected = dir
            .path()
            .join("example.com")
            .join("example.com")
            .join("report.pdf");
        assert!(expected.exists());
    }

    #[test]
    fn test_write_seed_page_lands_at_collection_root() {
        let dir = TempDir::new().unwrap();
        let sink = FsDocumentSink::new(dir.path());

        sink.write(
            "example.com",
            "https://example.com",
            SinkPayload::Text("seed".to_string()),
            ContentKind::Html,
            0,
        )
        .unwrap();

        let expected = dir.path().join("example.com").join("example.com.md");
        assert!(expected.exists());
    }

    #[test]
    fn test_unsupported_kind_is_rejected() {
        let dir = TempDir::new().unwrap();
        let sink = FsDocumentSink::new(dir.path());

        let result = sink.write(
            "example.com",
            "https://example.com/data",
            SinkPayload::Text("x".to_string()),
            ContentKind::Csv,
            0,
        );

        assert!(matches!(result, Err(SinkError::UnsupportedKind(_))));
    }
}
