//! HTTP transport for fetching search-result pages
//!
//! `PageTransport` is the seam between the Fetcher and the network: the
//! Fetcher owns retry, timeout and block classification, the transport
//! performs exactly one GET per call. `HttpClient` is the reqwest-backed
//! implementation used in production.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::config::defaults;

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Client identity sent as `User-Agent`
    pub user_agent: String,

    /// Sent as `Accept-Language`
    pub accept_language: String,

    /// Per-attempt timeout in seconds
    pub timeout_seconds: u64,

    /// TCP/TLS connect timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Redirect hops followed before giving up
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            connect_timeout_seconds: defaults::CONNECT_TIMEOUT_SECONDS,
            max_redirects: defaults::MAX_REDIRECTS,
        }
    }
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// What came back from a single GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// URL after redirects; relative links resolve against this
    pub final_url: Url,
    pub body: String,
}

/// Failure of a single GET, before any retry decision
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// One outbound GET per call. Implementations must not retry.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport with a browser-like identity
///
/// No cookie store is configured, so no session state survives between
/// calls.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid accept language")?,
        );

        let client = ClientBuilder::new()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn classify(error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

#[async_trait]
impl PageTransport for HttpClient {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Self::classify(&e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| Self::classify(&e))?;

        debug!("Received {} ({} bytes) from {}", status, body.len(), final_url);
        Ok(TransportResponse {
            status,
            final_url,
            body,
        })
    }
}
