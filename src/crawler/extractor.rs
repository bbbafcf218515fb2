//! Text extraction from rendered HTML
//!
//! This module converts a rendered page into the form that gets persisted
//! and later embedded:
//! - A link-free plain-text rendering (anchor text is kept, hrefs are not
//!   inlined, script/style subtrees are dropped)
//! - Blank-line trimming
//! - A small metadata header prepended to text-bearing documents
//!
//! Link enumeration for traversal also lives here, since both operations
//! walk the same rendered DOM.

use crate::content::ContentKind;
use chrono::NaiveDate;
use scraper::{Html, Node, Selector};

/// Elements whose entire subtree is excluded from text extraction
const SKIP_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that force a line break before their content
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "aside", "nav", "ul", "ol",
    "li", "table", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "form",
];

/// Extracts a link-free plain-text rendering of an HTML document
///
/// The walk keeps the text of every visible node (including anchor text)
/// and never inlines attribute values, so hyperlink targets are discarded.
/// Block-level elements start a new line; the result is then stripped of
/// blank lines.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                out.push_str(text);
                continue;
            }
            Node::Element(element) => {
                let name = element.name();
                if SKIP_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" || BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }

        // Push children in reverse so the pop order matches document order
        let mut children: Vec<_> = node.children().collect();
        children.reverse();
        stack.extend(children);
    }

    trim_blank_lines(&out)
}

/// Drops every line that is empty after trimming whitespace
pub fn trim_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Enumerates the raw `href` value of every anchor element
///
/// Values are returned untouched; resolution against the crawl's base
/// origin happens in the engine. Anchors carrying a `download` attribute
/// are skipped.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut hrefs = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                hrefs.push(href.to_string());
            }
        }
    }

    hrefs
}

/// Metadata prepended to every persisted text document
#[derive(Debug, Clone)]
pub struct DocumentHeader {
    /// Last path segment of the source URL
    pub title: String,

    /// The source URL itself
    pub source: String,

    /// Classified content kind
    pub kind: ContentKind,

    /// Date the content was retrieved
    pub retrieved: NaiveDate,
}

impl DocumentHeader {
    /// Builds the header for a URL retrieved today
    pub fn for_url(url: &str, kind: ContentKind) -> Self {
        Self {
            title: last_path_segment(url).to_string(),
            source: url.to_string(),
            kind,
            retrieved: chrono::Local::now().date_naive(),
        }
    }

    /// Renders the header as a markdown block
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Metadata for this file:\n\n");
        md.push_str(&format!("\n- title: {}", self.title));
        md.push_str(&format!("\n- source: {}", self.source));
        md.push_str(&format!("\n- file_type: {}", self.kind));
        md.push_str(&format!(
            "\n- retrieved_date: {}",
            self.retrieved.format("%Y-%m-%d")
        ));
        md.push_str("\n\n** END OF METADATA **\n\n");
        md
    }
}

/// Returns the last `/`-separated segment of a URL
fn last_path_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
