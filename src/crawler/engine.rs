//! Crawl engine - traversal orchestration
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! a crawl run:
//! - Maintaining the explicit worklist of `(url, depth)` pairs
//! - De-duplication, ignore-pattern and depth policy
//! - Dispatching fetched content by kind to rendering/extraction or
//!   raw-bytes persistence
//! - Discovering and enqueueing same-origin child links
//! - Releasing the renderer on every exit path
//!
//! Traversal is depth-first and synchronous: one URL is fully processed
//! before the next is taken off the worklist.

use crate::content::ContentKind;
use crate::crawler::extractor::{extract_hrefs, extract_text, DocumentHeader};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOutcome};
use crate::crawler::renderer::PageRenderer;
use crate::sink::{DocumentSink, SinkPayload};
use crate::url::{
    collection_from_seed, is_same_origin, normalize_candidate, origin_of, resolve_href,
};
use crate::{MagpieError, UrlError};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Immutable configuration for a single crawl run
///
/// Separated from the mutable [`CrawlState`] so the traversal policy cannot
/// change mid-run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    seed_url: String,
    origin: String,
    ignore_patterns: Vec<String>,
    max_depth: u32,
    collection: String,
    basic_auth: Option<(String, String)>,
    request_timeout_secs: u64,
}

impl CrawlConfig {
    /// Creates a crawl configuration from literal entry-point arguments
    ///
    /// The base origin and the collection name are derived from the seed;
    /// the collection can be overridden with [`CrawlConfig::with_collection`].
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The URL the crawl starts from (depth 0)
    /// * `ignore_patterns` - Substring patterns; a URL containing any of them
    ///   is never fetched
    /// * `max_depth` - Traversal ceiling in link-hops from the seed
    pub fn new(
        seed_url: impl Into<String>,
        ignore_patterns: Vec<String>,
        max_depth: u32,
    ) -> Result<Self, UrlError> {
        let seed_url = seed_url.into();
        let origin = origin_of(&seed_url)?;
        let collection = collection_from_seed(&seed_url)?;

        Ok(Self {
            seed_url,
            origin,
            ignore_patterns,
            max_depth,
            collection,
            basic_auth: None,
            request_timeout_secs: 10,
        })
    }

    /// Overrides the derived collection name
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sets HTTP basic auth credentials applied to every fetch
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    /// Overrides the per-request timeout (default 10 seconds)
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// The crawl's base origin (`scheme://host[:port]`)
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The collection name output is namespaced under
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Mutable state owned by one engine for the duration of a single run
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Normalized URL -> byte length of persisted content (0 for
    /// visited-but-empty, failed, or unsupported pages).
    ///
    /// A URL is inserted at most once; presence in this map is the sole
    /// de-duplication signal.
    visited: HashMap<String, u64>,
}

impl CrawlState {
    /// The visited ledger accumulated so far
    pub fn visited(&self) -> &HashMap<String, u64> {
        &self.visited
    }
}

/// Terminal report of a crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// The visited ledger: normalized URL -> persisted byte count
    pub visited: HashMap<String, u64>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Total number of visited URLs (including empty and failed ones)
    pub fn pages(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs that produced persisted content
    pub fn non_empty_pages(&self) -> usize {
        self.visited.values().filter(|len| **len > 0).count()
    }

    /// Total bytes persisted across the run
    pub fn total_bytes(&self) -> u64 {
        self.visited.values().sum()
    }
}

/// The crawl engine
///
/// Owns the immutable configuration, the mutable state, and the shared
/// resources (HTTP client, renderer, sink) for one run.
pub struct CrawlEngine<R: PageRenderer, S: DocumentSink> {
    config: CrawlConfig,
    state: CrawlState,
    client: Client,
    renderer: R,
    sink: S,
}

impl<R: PageRenderer, S: DocumentSink> CrawlEngine<R, S> {
    /// Creates an engine for one crawl run
    ///
    /// # Arguments
    ///
    /// * `config` - The immutable crawl configuration
    /// * `renderer` - JavaScript-capable page renderer (held for the run)
    /// * `sink` - Destination for extracted documents
    pub fn new(config: CrawlConfig, renderer: R, sink: S) -> Result<Self, MagpieError> {
        let client = build_http_client(config.request_timeout_secs)?;

        Ok(Self {
            config,
            state: CrawlState::default(),
            client,
            renderer,
            sink,
        })
    }

    /// Runs the crawl to completion
    ///
    /// The renderer is shut down on every exit path, including propagated
    /// errors, so the browser session is never leaked. Anticipated
    /// conditions (failed fetches, unsupported kinds, empty pages) never
    /// escape; only collaborator failures (renderer, sink) do.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The visited ledger and run duration
    /// * `Err(MagpieError)` - A collaborator failed; the run is aborted
    pub async fn run(mut self) -> Result<CrawlReport, MagpieError> {
        tracing::info!(
            "Starting crawl of {} (origin {}, max depth {})",
            self.config.seed_url,
            self.config.origin,
            self.config.max_depth
        );

        let started = Instant::now();
        let outcome = self.crawl_loop().await;

        // Release the browser session regardless of how the loop ended
        let shutdown = self.renderer.shutdown().await;

        outcome?;
        shutdown?;

        let report = CrawlReport {
            visited: self.state.visited,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} pages ({} with content, {} bytes) in {:.2?}",
            report.pages(),
            report.non_empty_pages(),
            report.total_bytes(),
            report.elapsed
        );

        Ok(report)
    }

    /// The main worklist loop
    async fn crawl_loop(&mut self) -> Result<(), MagpieError> {
        let mut worklist: Vec<(String, u32)> = vec![(self.config.seed_url.clone(), 0)];
        let started = Instant::now();
        let mut processed = 0usize;

        while let Some((candidate, depth)) = worklist.pop() {
            let url = normalize_candidate(&candidate);

            if let Some(pattern) = self
                .config
                .ignore_patterns
                .iter()
                .find(|p| url.contains(p.as_str()))
            {
                tracing::debug!("Skipping {} (ignore pattern '{}')", url, pattern);
                continue;
            }

            if self.state.visited.contains_key(&url) {
                continue;
            }

            if depth > self.config.max_depth {
                tracing::debug!("Skipping {} (depth {} exceeds ceiling)", url, depth);
                continue;
            }

            self.visit(&url, depth, &mut worklist).await?;
            processed += 1;

            if processed % 10 == 0 {
                let rate = processed as f64 / started.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages visited, {} queued, {:.2} pages/sec",
                    processed,
                    worklist.len(),
                    rate
                );
            }
        }

        Ok(())
    }

    /// Fetches, classifies, and processes one URL
    ///
    /// The URL has already passed the ignore/dedup/depth policy.
    async fn visit(
        &mut self,
        url: &str,
        depth: u32,
        worklist: &mut Vec<(String, u32)>,
    ) -> Result<(), MagpieError> {
        tracing::debug!("Fetching {} (depth {})", url, depth);

        let outcome = fetch_url(&self.client, url, self.config.basic_auth.as_ref()).await;

        let (content_type, body) = match outcome {
            FetchOutcome::Success {
                content_type, body, ..
            } => (content_type, body),
            FetchOutcome::HttpFailure { status } => {
                tracing::warn!("Failed to fetch {} with status code {}", url, status);
                self.state.visited.insert(url.to_string(), 0);
                return Ok(());
            }
            FetchOutcome::NetworkFailure { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                self.state.visited.insert(url.to_string(), 0);
                return Ok(());
            }
        };

        let kind = ContentKind::from_content_type(&content_type);

        match kind {
            ContentKind::Html => self.visit_html(url, depth, worklist).await,
            ContentKind::Pdf | ContentKind::Docx => {
                let written = self.sink.write(
                    &self.config.collection,
                    url,
                    SinkPayload::Binary(body),
                    kind,
                    depth,
                )?;
                self.state.visited.insert(url.to_string(), written);
                Ok(())
            }
            ContentKind::Xlsx | ContentKind::Csv | ContentKind::Pptx | ContentKind::Unsupported => {
                tracing::warn!("Unsupported content type for {}: {}", url, content_type);
                self.state.visited.insert(url.to_string(), 0);
                Ok(())
            }
        }
    }

    /// Renders an HTML page, persists its text, and enqueues its links
    async fn visit_html(
        &mut self,
        url: &str,
        depth: u32,
        worklist: &mut Vec<(String, u32)>,
    ) -> Result<(), MagpieError> {
        let rendered = self.renderer.render(url).await?;

        let text = extract_text(&rendered);

        // Empty pages count as visited but contribute nothing downstream;
        // their links are not followed (emptiness is checked before
        // discovery, matching the original crawler's order).
        if text.is_empty() {
            tracing::debug!("No text extracted from {}", url);
            self.state.visited.insert(url.to_string(), 0);
            return Ok(());
        }

        let header = DocumentHeader::for_url(url, ContentKind::Html);
        let document = format!("{}{}", header.to_markdown(), text);

        let written = self.sink.write(
            &self.config.collection,
            url,
            SinkPayload::Text(document),
            ContentKind::Html,
            depth,
        )?;
        self.state.visited.insert(url.to_string(), written);

        // Enqueue same-origin children; reverse so the first link on the
        // page is the next one popped (depth-first in document order)
        let children = self.discover_links(&rendered);
        for child in children.into_iter().rev() {
            worklist.push((child, depth + 1));
        }

        Ok(())
    }

    /// Resolves the page's anchors into traversal candidates
    ///
    /// Applies the resolution rules, the same-origin fence, and a dedup
    /// pre-check against the visited ledger. The worklist pop re-checks the
    /// ledger, so this pre-check only keeps the queue small.
    fn discover_links(&self, rendered: &str) -> Vec<String> {
        let mut candidates = Vec::new();

        for href in extract_hrefs(rendered) {
            let resolved = match resolve_href(&href, &self.config.origin) {
                Some(resolved) => resolved,
                None => continue,
            };

            if !is_same_origin(&resolved, &self.config.origin) {
                continue;
            }

            let normalized = normalize_candidate(&resolved);
            if self.state.visited.contains_key(&normalized) {
                continue;
            }

            candidates.push(normalized);
        }

        candidates
    }
}
