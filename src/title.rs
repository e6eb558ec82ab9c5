//! title command: resolve URLs to titles directly
//!
//! Same resolver as `process`, without a document. Handy for checking what a
//! footnote will turn into.

use crate::context::RunContext;
use crate::fetch::{build_fetcher, FetchConfig, TransportKind, DEFAULT_USER_AGENT};
use crate::resolver::{Resolution, TitleResolver};
use crate::stats::Progress;
use anyhow::Result;
use chrono::Local;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct TitleArgs {
    /// URLs to resolve (multiple allowed)
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Output format: json (default) or yaml
    #[arg(long, short, default_value = "json")]
    pub format: String,

    /// Transport used to fetch URLs
    #[arg(long, value_enum, default_value = "http", env = "REF_FOOTNOTES_TRANSPORT")]
    pub transport: TransportKind,

    /// Timeout per URL in milliseconds
    #[arg(long, default_value = "10000", env = "REF_FOOTNOTES_TIMEOUT")]
    pub timeout: u64,

    /// Directory for the error log (created only if something fails)
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub error_log_dir: PathBuf,
}

/// One resolved URL
#[derive(Debug, Serialize)]
pub struct TitleResult {
    pub url: String,
    pub ok: bool,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// All resolved URLs
#[derive(Debug, Serialize)]
pub struct TitleReport {
    pub ok: usize,
    pub failed: usize,
    pub results: Vec<TitleResult>,
}

pub async fn run_title(args: TitleArgs) -> Result<()> {
    let config = FetchConfig {
        transport: args.transport,
        timeout_ms: args.timeout,
        user_agent: DEFAULT_USER_AGENT.to_string(),
    };

    eprintln!(
        "Resolving {} URL{}...",
        args.urls.len(),
        if args.urls.len() == 1 { "" } else { "s" }
    );

    let mut resolver = TitleResolver::new(build_fetcher(&config).await?);
    let mut ctx = RunContext::new(&args.error_log_dir, Local::now(), Progress::Quiet);

    let report = resolve_titles(&args.urls, &resolver, &mut ctx).await;

    if let Err(e) = resolver.close().await {
        tracing::warn!(error = %e, "failed to shut down transport");
    }

    let output = match args.format.as_str() {
        "yaml" | "yml" => serde_yaml::to_string(&report)?,
        _ => serde_json::to_string(&report)?,
    };
    println!("{}", output.trim_end());

    eprintln!("Done: {}/{} OK", report.ok, report.ok + report.failed);
    if report.failed > 0 && ctx.error_log.is_created() {
        eprintln!("Errors logged to: {}", ctx.error_log.path().display());
    }

    Ok(())
}

/// Resolve URLs one after another
pub async fn resolve_titles(
    urls: &[String],
    resolver: &TitleResolver,
    ctx: &mut RunContext,
) -> TitleReport {
    let mut results = Vec::with_capacity(urls.len());

    for url in urls {
        eprintln!("  -> {}", truncate(url, 60));

        let resolution = resolver.resolve(url, url, ctx).await;
        let err = match resolution {
            Resolution::Title(_) => None,
            _ => ctx.error_log.entries().last().map(|e| e.reason.clone()),
        };

        results.push(TitleResult {
            url: url.clone(),
            ok: resolution.is_title(),
            title: resolution.as_str().to_string(),
            err,
        });
    }

    let ok = results.iter().filter(|r| r.ok).count();
    TitleReport {
        ok,
        failed: results.len() - ok,
        results,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    }
}
