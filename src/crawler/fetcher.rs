//! HTTP fetcher implementation
//!
//! This module handles the crawl's HTTP boundary:
//! - Building the HTTP client with a proper user agent string
//! - One GET request per URL with a fixed timeout
//! - Optional HTTP basic auth
//! - Error classification into fetch outcomes
//!
//! There is no retry logic anywhere on this boundary: a failed URL is
//! recorded as an empty visit by the engine and never fetched again.

use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the resource (2xx status)
    Success {
        /// HTTP status code
        status: u16,
        /// Content-Type header value (empty string when absent)
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Server answered with a non-2xx status
    HttpFailure {
        /// The HTTP status code
        status: u16,
    },

    /// Network error (connection refused, timeout, DNS failure, etc.)
    NetworkFailure {
        /// Error description
        error: String,
    },
}

/// Builds the crawler's HTTP client
///
/// # Arguments
///
/// * `timeout_secs` - Per-request timeout in seconds
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    let user_agent = format!("magpie/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the result
///
/// # Outcome Mapping
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | 2xx status | `Success` with body and content type |
/// | Any other status | `HttpFailure` |
/// | Timeout / connect / DNS error | `NetworkFailure` |
/// | Body read error | `NetworkFailure` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `basic_auth` - Optional `(username, password)` pair
pub async fn fetch_url(
    client: &Client,
    url: &str,
    basic_auth: Option<&(String, String)>,
) -> FetchOutcome {
    let mut request = client.get(url);

    if let Some((username, password)) = basic_auth {
        request = request.basic_auth(username, Some(password));
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                return FetchOutcome::HttpFailure {
                    status: status.as_u16(),
                };
            }

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            match response.bytes().await {
                Ok(body) => FetchOutcome::Success {
                    status: status.as_u16(),
                    content_type,
                    body: body.to_vec(),
                },
                Err(e) => FetchOutcome::NetworkFailure {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::NetworkFailure { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(10);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network_failure() {
        let client = build_http_client(1).unwrap();
        // Port 9 (discard) on localhost is almost certainly closed
        let outcome = fetch_url(&client, "http://127.0.0.1:9/", None).await;
        assert!(matches!(outcome, FetchOutcome::NetworkFailure { .. }));
    }
}
