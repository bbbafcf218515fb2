use serde::Deserialize;

/// Main configuration structure for Magpie
///
/// Every section has sensible defaults, so a missing config file (or a file
/// with only some sections) still yields a working configuration pointed at
/// a local Ollama server and a local chromedriver.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub crawler: CrawlerSettings,
    pub output: OutputConfig,
}

/// Ollama backend connection and model selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama server host
    pub host: String,

    /// Ollama server port
    pub port: u16,

    /// Model used for embedding documents and questions
    #[serde(rename = "embedding-model")]
    pub embedding_model: String,

    /// Model used for answer generation
    #[serde(rename = "generation-model")]
    pub generation_model: String,
}

impl LlmConfig {
    /// The HTTP base URL of the Ollama server
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            embedding_model: "all-minilm".to_string(),
            generation_model: "llama3".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Default traversal ceiling when the CLI does not pass one
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// WebDriver endpoint used for JavaScript-capable page rendering
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Optional HTTP basic auth user name applied to every fetch
    #[serde(rename = "basic-auth-username")]
    pub basic_auth_username: Option<String>,

    /// Optional HTTP basic auth password
    #[serde(rename = "basic-auth-password")]
    pub basic_auth_password: Option<String>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_depth: 2,
            request_timeout_secs: 10,
            webdriver_url: "http://localhost:9515".to_string(),
            basic_auth_username: None,
            basic_auth_password: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for persisted documents
    #[serde(rename = "root-path")]
    pub root_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_path: "web_docs".to_string(),
        }
    }
}
