//! Resource title resolution
//!
//! One fetch per URL, classified by declared content type:
//! - `application/pdf`: metadata title, else "Untitled PDF"
//! - `text/html`, `application/xhtml+xml`: first `<title>`, else "Untitled Webpage"
//! - anything else: "Unknown Resource"
//!
//! Bot-protection interstitials (Cloudflare and friends) are failures.
//! Nothing escapes [`TitleResolver::resolve`]: every failure becomes a
//! placeholder, an error log entry and a bump of the error counter.

use crate::context::RunContext;
use crate::error::ResolveError;
use crate::error_log::ErrorEntry;
use crate::fetch::{FetchResponse, Fetcher};
use crate::pdf;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const UNTITLED_PDF: &str = "Untitled PDF";
pub const UNTITLED_WEBPAGE: &str = "Untitled Webpage";
pub const UNKNOWN_RESOURCE: &str = "Unknown Resource";
pub const ERROR_PLACEHOLDER: &str = "Error retrieving title";

/// Title prefixes served by challenge pages instead of the real content
const INTERSTITIAL_PREFIXES: [&str; 2] = ["verifying if your connection", "checking your browser"];

/// Exact challenge page titles
const INTERSTITIAL_TITLES: [&str; 1] = ["just a moment..."];

/// Bytes scanned for a `<meta>` charset declaration
const META_SNIFF_LEN: usize = 4096;

/// `<meta charset="x">` or `<meta http-equiv="Content-Type" content="text/html; charset=x">`
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).unwrap()
});

/// Outcome of resolving one URL. Always exactly one per resolvable footnote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Title(String),
    ErrorPlaceholder,
    UnknownResource,
}

impl Resolution {
    /// Text to put inside the link brackets
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Title(t) => t,
            Resolution::ErrorPlaceholder => ERROR_PLACEHOLDER,
            Resolution::UnknownResource => UNKNOWN_RESOURCE,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Resolution::Title(_))
    }
}

/// How a response body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Html,
    Other,
}

/// Classify a declared `Content-Type` header value
pub fn classify_content_type(content_type: &str) -> ContentKind {
    let lower = content_type.to_ascii_lowercase();
    if lower.contains("application/pdf") {
        ContentKind::Pdf
    } else if lower.contains("text/html") || lower.contains("application/xhtml+xml") {
        ContentKind::Html
    } else {
        ContentKind::Other
    }
}

/// `charset` parameter of a `Content-Type` value, unquoted
fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(['"', '\'']))
        } else {
            None
        }
    })
}

/// Charset declared in the document head
fn meta_charset(body: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&body[..body.len().min(META_SNIFF_LEN)]);
    META_CHARSET.captures(&head).map(|cap| cap[1].to_string())
}

/// Decode an HTML body: header charset, then `<meta>` charset, then UTF-8.
/// A byte order mark wins over all of them.
pub fn decode_html(content_type: &str, body: &[u8]) -> String {
    let encoding = header_charset(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(body).and_then(|label| Encoding::for_label(label.as_bytes())))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "malformed sequences replaced while decoding");
    }
    text.into_owned()
}

/// Text of the first `<title>` element, trimmed; `None` when missing or blank
pub fn html_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Does this page title belong to a bot-protection challenge?
pub fn is_bot_protection(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    lower.contains("cloudflare")
        || INTERSTITIAL_PREFIXES.iter().any(|p| lower.starts_with(p))
        || INTERSTITIAL_TITLES.contains(&lower.as_str())
}

/// Turns URLs into titles through an injected transport
pub struct TitleResolver {
    fetcher: Box<dyn Fetcher>,
}

impl TitleResolver {
    pub fn new(fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve `url`, absorbing every failure.
    ///
    /// `original_footnote` is the definition text as it appeared in the
    /// document, recorded in the error log when resolution fails.
    pub async fn resolve(
        &self,
        url: &str,
        original_footnote: &str,
        ctx: &mut RunContext,
    ) -> Resolution {
        tracing::debug!(url, "fetching title");

        match self.try_resolve(url).await {
            Ok(title) => {
                tracing::debug!(url, title = %title, "retrieved title");
                Resolution::Title(title)
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "error retrieving title");
                let placeholder = match e {
                    ResolveError::UnknownContentType(_) => Resolution::UnknownResource,
                    _ => Resolution::ErrorPlaceholder,
                };
                ctx.record_error(ErrorEntry {
                    url: url.to_string(),
                    footnote: original_footnote.to_string(),
                    reason: e.to_string(),
                })
                .await;
                placeholder
            }
        }
    }

    /// One fetch, then title extraction by content type
    pub async fn try_resolve(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.fetcher.fetch(url).await?;
        tracing::debug!(
            url,
            status = response.status,
            content_type = %response.content_type,
            bytes = response.body.len(),
            "fetched"
        );
        extract_title(&response)
    }

    /// Shut the transport down
    pub async fn close(&mut self) -> anyhow::Result<()> {
        self.fetcher.close().await
    }
}

/// Title from an already fetched response
pub fn extract_title(response: &FetchResponse) -> Result<String, ResolveError> {
    match classify_content_type(&response.content_type) {
        ContentKind::Pdf => {
            Ok(pdf::metadata_title(&response.body).unwrap_or_else(|| UNTITLED_PDF.to_string()))
        }
        ContentKind::Html => {
            let html = decode_html(&response.content_type, &response.body);
            let title = html_title(&html).unwrap_or_else(|| UNTITLED_WEBPAGE.to_string());
            if is_bot_protection(&title) {
                return Err(ResolveError::BotProtection(title));
            }
            Ok(title)
        }
        ContentKind::Other => Err(ResolveError::UnknownContentType(
            response.content_type.clone(),
        )),
    }
}
