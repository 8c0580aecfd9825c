//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the crawler:
//! - Building the HTTP client with user agent and bounded timeouts
//! - Single GET requests returning the raw markup
//! - Error classification into `FetchError`
//! - Optional retries for 5xx responses and timeouts

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Delay between two attempts at the same URL
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Why a page could not be fetched
///
/// Every variant is non-fatal to a crawl: the URL is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Not an HTML page: {url} ({content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was for
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Body { url, .. }
            | Self::NotHtml { url, .. }
            | Self::Request { url, .. } => url,
        }
    }

    /// Server errors and timeouts may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Something that can turn a URL into raw markup
///
/// The crawler is generic over this so it can run against an in-memory site.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use site_chat::config::HttpConfig;
/// use site_chat::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and returns its body
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with textual Content-Type | `Ok(body)` |
/// | non-2xx | `FetchError::Status` |
/// | binary Content-Type (pdf, images, ...) | `FetchError::NotHtml` |
/// | timeout | `FetchError::Timeout` |
/// | connection refused, DNS, TLS | `FetchError::Connect` |
pub async fn fetch_url(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_textual(&content_type) {
        return Err(FetchError::NotHtml {
            url: url.to_string(),
            content_type,
        });
    }

    response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Missing Content-Type is given the benefit of the doubt
fn is_textual(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.is_empty() || ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
}

fn classify(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// The production fetcher: reqwest client plus retry policy
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Builds a fetcher from the `[http]` section
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            max_retries: config.max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Overrides the pause between attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match fetch_url(&self.client, url).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} ({}/{}) after: {}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }
}
