//! Page rendering for JavaScript-heavy sites
//!
//! Client-rendered pages are common, so HTML is rendered through a
//! JavaScript-capable engine (a headless browser behind a WebDriver
//! endpoint) rather than parsed from the raw response body. The
//! [`PageRenderer`] trait keeps that choice at a seam: tests and the
//! `--no-render` mode substitute a plain HTTP fetch.

use async_trait::async_trait;
use fantoccini::ClientBuilder;
use thiserror::Error;

/// Errors that can occur while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("WebDriver session error: {0}")]
    Session(String),

    #[error("Failed to render {url}: {message}")]
    Render { url: String, message: String },
}

/// Trait for page renderers
///
/// A renderer is a shared, long-lived resource held for the crawl's
/// duration. The engine calls [`PageRenderer::shutdown`] on every exit path
/// so that no browser session is leaked.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigates to the URL and returns the rendered page source
    async fn render(&self, url: &str) -> Result<String, RenderError>;

    /// Releases the renderer's resources
    async fn shutdown(&self) -> Result<(), RenderError>;
}

/// Renderer backed by a headless Chrome session over WebDriver
pub struct WebDriverRenderer {
    client: fantoccini::Client,
}

impl WebDriverRenderer {
    /// Opens a headless browser session against a WebDriver endpoint
    ///
    /// # Arguments
    ///
    /// * `webdriver_url` - The WebDriver endpoint (e.g. a local chromedriver
    ///   at `http://localhost:9515`)
    pub async fn connect(webdriver_url: &str) -> Result<Self, RenderError> {
        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": ["--headless=new", "--disable-gpu"] }),
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|e| RenderError::Session(e.to_string()))?;

        tracing::debug!("WebDriver session established at {}", webdriver_url);

        Ok(Self { client })
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        // fantoccini clients are cheap handles onto one underlying session
        let mut client = self.client.clone();

        client.goto(url).await.map_err(|e| RenderError::Render {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        client.source().await.map_err(|e| RenderError::Render {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| RenderError::Session(e.to_string()))
    }
}

/// Renderer that returns the raw response body without executing scripts
///
/// Used by tests and by the `--no-render` mode for sites known to be
/// server-rendered.
pub struct StaticRenderer {
    client: reqwest::Client,
}

impl StaticRenderer {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RenderError::Render {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        response.text().await.map_err(|e| RenderError::Render {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        // Nothing to release
        Ok(())
    }
}
