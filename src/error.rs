//! Failure taxonomy for title resolution

use std::time::Duration;
use thiserror::Error;

/// Transport-level failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not an absolute http(s) URL: {0}")]
    InvalidUrl(String),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),
}

/// Any reason a URL did not yield a usable title
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unknown content type {0:?}")]
    UnknownContentType(String),

    #[error("bot protection page detected: {0:?}")]
    BotProtection(String),
}
