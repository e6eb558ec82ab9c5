//! Footnote rewriting: bare-URL definitions become titled, dated links
//!
//! ```text
//! [^3]: https://example.com/a
//! [^3]: [Example A](https://example.com/a) retrieved on 2025-06-01
//! ```
//!
//! Only a definition whose whole body is one http(s) URL is touched.
//! Definitions that already hold a link, or any prose, are left as they are.

use crate::context::RunContext;
use crate::edit::{self, Replacement};
use crate::fetch::parse_http_url;
use crate::resolver::TitleResolver;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// `[^label]: URL` on a line of its own, trailing blanks allowed
static URL_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\[\^([^\]\s]+)\]:[ \t]+(https?://\S+)[ \t]*(\r?)$").unwrap()
});

/// A definition whose body is a bare URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlDefinition {
    /// Byte span of the definition, line ending excluded
    pub range: Range<usize>,
    pub label: String,
    pub url: String,
    /// The definition text as found, for the error log
    pub original: String,
    line_end: String,
}

/// Find every resolvable definition, in document order
pub fn find_url_definitions(text: &str) -> Vec<UrlDefinition> {
    URL_DEFINITION
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let url = &cap[2];
            if !is_bare_url(url) {
                return None;
            }
            let line_end = cap[3].to_string();
            let original = whole.as_str()[..whole.len() - line_end.len()]
                .trim_end()
                .to_string();
            Some(UrlDefinition {
                range: whole.range(),
                label: cap[1].to_string(),
                url: url.to_string(),
                original,
                line_end,
            })
        })
        .collect()
}

/// A URL token with no markup wrapped around or inside it
fn is_bare_url(token: &str) -> bool {
    !token.contains(['<', '>']) && !token.contains("](") && parse_http_url(token).is_ok()
}

/// Make a title safe for one line of link text
pub fn link_text(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

/// `[^label]: [title](url) retrieved on date`
pub fn rewrite_definition(label: &str, title: &str, url: &str, date: &str) -> String {
    format!(
        "[^{}]: [{}]({}) retrieved on {}",
        label,
        link_text(title),
        url,
        date
    )
}

/// Resolve each bare-URL definition in order and rewrite it.
///
/// Resolution never fails, so every definition found is rewritten.
pub async fn rewrite_footnotes(
    text: &str,
    resolver: &TitleResolver,
    ctx: &mut RunContext,
) -> String {
    let definitions = find_url_definitions(text);
    let date = ctx.retrieved_on_str();
    let mut replacements = Vec::with_capacity(definitions.len());

    for def in definitions {
        ctx.counters.footnotes_seen += 1;
        tracing::debug!(label = %def.label, url = %def.url, "processing footnote");

        let resolution = resolver.resolve(&def.url, &def.original, ctx).await;
        let rewritten = rewrite_definition(&def.label, resolution.as_str(), &def.url, &date);

        ctx.counters.links_resolved += 1;
        tracing::debug!(footnote = %rewritten, "updated footnote");
        ctx.report_progress();

        replacements.push(Replacement {
            range: def.range,
            text: rewritten + &def.line_end,
        });
    }

    edit::apply(text, &replacements)
}
