//! Transports: fetch a URL once and hand back content type, body and status
//!
//! The transport is picked once at startup and injected into the resolver.
//! `http` is a plain reqwest client; `browser` drives headless Chrome, which
//! gets through the simple JavaScript challenges that block plain clients.

use crate::browser::{BrowserPage, BrowserPool};
use crate::error::FetchError;
use crate::resolver::{classify_content_type, ContentKind};
use anyhow::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Which transport to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportKind {
    /// Plain HTTP client
    #[default]
    Http,
    /// Headless Chrome (handles bot challenges, slower)
    Browser,
}

/// Transport settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub transport: TransportKind,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Http,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// What a single GET produced
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Declared content type, empty when the server sent none
    pub content_type: String,
    /// Left empty by the HTTP transport when the content type carries no title
    pub body: Vec<u8>,
    pub status: u16,
}

/// Capability: one GET per call, redirects followed, timeout enforced
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Release anything held open (browser process, connections)
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Build the configured transport
pub async fn build_fetcher(config: &FetchConfig) -> Result<Box<dyn Fetcher>> {
    match config.transport {
        TransportKind::Http => Ok(Box::new(HttpFetcher::new(config)?)),
        TransportKind::Browser => Ok(Box::new(BrowserFetcher::new(config).await?)),
    }
}

/// Reject anything that is not an absolute http(s) URL before touching the network
pub fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    match Url::parse(url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => Ok(u),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

/// Direct reqwest transport
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(e)
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let url = parse_http_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // No title can come out of other types, so their bodies are never downloaded
        if classify_content_type(&content_type) == ContentKind::Other {
            tracing::debug!(content_type = %content_type, "skipping body");
            return Ok(FetchResponse {
                content_type,
                body: Vec::new(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(FetchResponse {
            content_type,
            body: body.to_vec(),
            status,
        })
    }
}

/// Headless Chrome transport, one tab at a time
pub struct BrowserFetcher {
    pool: BrowserPool,
    timeout_ms: u64,
}

impl BrowserFetcher {
    pub async fn new(config: &FetchConfig) -> Result<Self> {
        let pool = BrowserPool::new(1, &config.user_agent).await?;
        Ok(Self {
            pool,
            timeout_ms: config.timeout_ms,
        })
    }

    async fn load(&self, page: &BrowserPage, url: &str) -> Result<FetchResponse, FetchError> {
        let nav = page
            .goto(url, self.timeout_ms)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        if let Some(error) = nav.error {
            return Err(if nav.timed_out {
                FetchError::Timeout(Duration::from_millis(self.timeout_ms))
            } else {
                FetchError::Browser(error)
            });
        }

        let content_type = page.content_type().await;
        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        Ok(FetchResponse {
            content_type,
            body: html.into_bytes(),
            status: nav.status,
        })
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let url = parse_http_url(url)?;

        let page = self
            .pool
            .new_page()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let result = self.load(&page, url.as_str()).await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "failed to close tab");
        }

        result
    }

    async fn close(&mut self) -> Result<()> {
        self.pool.close().await
    }
}
