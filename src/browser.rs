//! Headless Chrome browser management via chromiumoxide

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Browser pool configuration
pub struct BrowserPool {
    browser: Browser,
    semaphore: Arc<Semaphore>,
    user_agent: String,
}

impl BrowserPool {
    /// Launch Chrome with a tab concurrency limit
    pub async fn new(concurrency: usize, user_agent: &str) -> Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-setuid-sandbox")
            .arg("--no-first-run")
            .arg("--headless=new")
            .build()
            .map_err(|e| anyhow::anyhow!("Browser config error: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch Chrome. Is Chrome/Chromium installed?")?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });

        tracing::debug!(concurrency, "browser launched");

        Ok(Self {
            browser,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            user_agent: user_agent.to_string(),
        })
    }

    /// Open a blank tab with the user agent override applied
    pub async fn new_page(&self) -> Result<BrowserPage> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        let page = self.browser.new_page("about:blank").await?;

        page.execute(
            chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams::new(
                &self.user_agent,
            ),
        )
        .await?;

        Ok(BrowserPage {
            page,
            _permit: permit,
        })
    }

    /// Close the browser
    pub async fn close(&mut self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// A browser tab holding one pool permit
pub struct BrowserPage {
    page: Page,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl BrowserPage {
    /// Navigate and wait for the load to settle (redirects and JS challenges included)
    pub async fn goto(&self, url: &str, timeout_ms: u64) -> Result<PageResult> {
        let nav_result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match nav_result {
            // chromiumoxide doesn't expose the HTTP status; a completed load reports 200
            Ok(Ok(_)) => Ok(PageResult {
                status: 200,
                error: None,
                timed_out: false,
            }),
            Ok(Err(e)) => {
                let reason = classify_error(&e.to_string());
                Ok(PageResult {
                    status: 0,
                    error: Some(format!("{}: {}", reason, e)),
                    timed_out: reason == "TIMEOUT",
                })
            }
            Err(_) => Ok(PageResult {
                status: 0,
                error: Some("Navigation timeout".to_string()),
                timed_out: true,
            }),
        }
    }

    /// MIME type of the loaded document, as the browser understood it
    pub async fn content_type(&self) -> String {
        match self.page.evaluate("document.contentType").await {
            Ok(result) => result.into_value::<String>().unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "document.contentType unavailable");
                String::new()
            }
        }
    }

    /// Serialized DOM after scripts ran
    pub async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .context("Failed to get page content")
    }

    /// Close the tab and release the permit
    pub async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}

/// Result of a page navigation
#[derive(Debug)]
pub struct PageResult {
    pub status: u16,
    pub error: Option<String>,
    pub timed_out: bool,
}

fn classify_error(error: &str) -> &'static str {
    if error.contains("ERR_NAME_NOT_RESOLVED") {
        "DNS_FAILED"
    } else if error.contains("ERR_CONNECTION_REFUSED") {
        "CONNECTION_REFUSED"
    } else if error.contains("ERR_CONNECTION_TIMED_OUT") || error.contains("ERR_TIMED_OUT") {
        "TIMEOUT"
    } else if error.contains("ERR_CERT") || error.contains("SSL") {
        "SSL_ERROR"
    } else {
        "NETWORK_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error() {
        assert_eq!(classify_error("net::ERR_NAME_NOT_RESOLVED"), "DNS_FAILED");
        assert_eq!(classify_error("ERR_CONNECTION_REFUSED"), "CONNECTION_REFUSED");
        assert_eq!(classify_error("net::ERR_CONNECTION_TIMED_OUT"), "TIMEOUT");
        assert_eq!(classify_error("random error"), "NETWORK_ERROR");
    }
}
