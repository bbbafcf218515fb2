//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed timeout and no retries
//! - Browser-driven page rendering for JavaScript-heavy sites
//! - Link-free text extraction and metadata headers
//! - Worklist-based depth-first traversal with de-duplication

mod engine;
mod extractor;
mod fetcher;
mod renderer;

pub use engine::{CrawlConfig, CrawlEngine, CrawlReport, CrawlState};
pub use extractor::{extract_hrefs, extract_text, trim_blank_lines, DocumentHeader};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome};
pub use renderer::{PageRenderer, RenderError, StaticRenderer, WebDriverRenderer};
