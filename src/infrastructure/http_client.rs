//! HTTP client for site scraping with rate limiting and charset-aware
//! body decoding.
//!
//! All adapters share one client so the outbound request rate is bounded
//! globally. Responses are decoded according to the adapter's expected
//! charset: most sites are UTF-8, but Dangdang serves GBK regardless of
//! what its headers claim, so decoding is forced rather than negotiated.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use thiserror::Error;

/// Accept header used for bestseller listing pages.
pub const ACCEPT_LISTING: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
/// Accept header used for per-book detail pages.
pub const ACCEPT_DETAIL: &str = "text/html";

/// Expected response charset for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Gbk,
}

/// Fetch failure taxonomy surfaced to adapters.
///
/// The `Display` output of each variant is exactly the error string the
/// adapter records: `"HTTP {status}: {status_text}"` for protocol
/// failures, the underlying message verbatim for transport failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let scrape = crate::infrastructure::config::ScrapeConfig::default();
        Self {
            user_agent: scrape.user_agent,
            timeout_seconds: scrape.request_timeout_seconds,
            max_requests_per_second: scrape.max_requests_per_second,
        }
    }
}

impl From<&crate::infrastructure::config::ScrapeConfig> for HttpClientConfig {
    fn from(scrape: &crate::infrastructure::config::ScrapeConfig) -> Self {
        Self {
            user_agent: scrape.user_agent.clone(),
            timeout_seconds: scrape.request_timeout_seconds,
            max_requests_per_second: scrape.max_requests_per_second,
        }
    }
}

/// Rate-limited HTTP client shared by all site adapters.
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// GET a page and decode its body with the expected charset.
    ///
    /// Non-2xx responses and transport-level failures both map to
    /// [`FetchError`]; callers decide whether that fails the whole
    /// adapter run or merely skips an enrichment.
    pub async fn get_html(
        &self,
        url: &str,
        accept: &str,
        accept_language: &str,
        charset: Charset,
    ) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .header(ACCEPT_LANGUAGE, accept_language)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let body = match charset {
            Charset::Utf8 => String::from_utf8_lossy(&bytes).into_owned(),
            Charset::Gbk => encoding_rs::GBK.decode(&bytes).0.into_owned(),
        };

        tracing::debug!(url, bytes = bytes.len(), "fetched page");
        Ok(body)
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
