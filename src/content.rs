//! Content kind definitions for classifying fetched resources
//!
//! The kind of a fetched resource is decided exclusively from the
//! transport-reported `content-type` header, never from the URL suffix.
//! It drives the extraction strategy and the output file extension.

use std::fmt;

/// The classified kind of a fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// HTML page, rendered through a JavaScript-capable engine before extraction
    Html,

    /// PDF document, persisted as raw bytes
    Pdf,

    /// Word document (DOCX), persisted as raw bytes
    Docx,

    // ===== Known but unsupported kinds =====
    /// Excel / spreadsheet document (XLSX)
    Xlsx,

    /// Comma-separated values
    Csv,

    /// PowerPoint document (PPTX)
    Pptx,

    /// Anything the crawler does not recognize
    Unsupported,
}

impl ContentKind {
    /// Classifies a resource from its `content-type` header value
    ///
    /// Matching is by substring containment, so parameterized values such as
    /// `text/html; charset=utf-8` classify correctly. A missing header
    /// classifies as [`ContentKind::Unsupported`].
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.contains("text/html") {
            Self::Html
        } else if content_type.contains("application/pdf") {
            Self::Pdf
        } else if content_type
            .contains("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        {
            Self::Docx
        } else if content_type
            .contains("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
            || content_type.contains("application/vnd.ms-excel")
        {
            Self::Xlsx
        } else if content_type.contains("text/csv") {
            Self::Csv
        } else if content_type
            .contains("application/vnd.openxmlformats-officedocument.presentationml.presentation")
        {
            Self::Pptx
        } else {
            Self::Unsupported
        }
    }

    /// Returns true if the crawler extracts and persists this kind
    ///
    /// `Xlsx`, `Csv` and `Pptx` are recognized formats that are deliberately
    /// not handled; they are distinct from `Unsupported` only in logging.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Html | Self::Pdf | Self::Docx)
    }

    /// Returns true if this kind produces extracted text (and a metadata header)
    pub fn is_text_bearing(&self) -> bool {
        matches!(self, Self::Html)
    }

    /// Output file extension for persisted content
    ///
    /// Returns None for kinds that are never persisted.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Html => Some("md"),
            Self::Pdf => Some("pdf"),
            Self::Docx => Some("docx"),
            Self::Xlsx | Self::Csv | Self::Pptx | Self::Unsupported => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Html => "Web Page (HTML)",
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (DOCX)",
            Self::Xlsx => "Excel / Spreadsheet Document (XLSX)",
            Self::Csv => "CSV",
            Self::Pptx => "PowerPoint Document (PPTX)",
            Self::Unsupported => "Unsupported",
        };
        write!(f, "{}", label)
    }
}
