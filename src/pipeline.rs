//! process command: separate markers, then rewrite bare-URL footnotes
//!
//! raw text -> separator -> footnote rewriter (one resolution at a time) -> output

use crate::context::RunContext;
use crate::fetch::{build_fetcher, FetchConfig, TransportKind, DEFAULT_USER_AGENT};
use crate::footnotes::rewrite_footnotes;
use crate::resolver::TitleResolver;
use crate::separator::separate_markers;
use crate::stats::{Progress, RunSummary};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Markdown file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// File to write the rewritten document to
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Trace every step instead of showing a progress line
    #[arg(long)]
    pub debug: bool,

    /// Transport used to fetch footnote URLs
    #[arg(long, value_enum, default_value = "http", env = "REF_FOOTNOTES_TRANSPORT")]
    pub transport: TransportKind,

    /// Timeout per URL in milliseconds
    #[arg(long, default_value = "10000", env = "REF_FOOTNOTES_TIMEOUT")]
    pub timeout: u64,

    /// Directory for the error log (created only if something fails)
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub error_log_dir: PathBuf,
}

/// Configuration for a process run
pub struct ProcessConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fetch: FetchConfig,
    pub error_log_dir: PathBuf,
    pub progress: Progress,
}

impl From<ProcessArgs> for ProcessConfig {
    fn from(args: ProcessArgs) -> Self {
        Self {
            input: args.input,
            output: args.output,
            fetch: FetchConfig {
                transport: args.transport,
                timeout_ms: args.timeout,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            error_log_dir: args.error_log_dir,
            progress: if args.debug {
                Progress::Quiet
            } else {
                Progress::Line
            },
        }
    }
}

/// Run the process command
pub async fn run_process(args: ProcessArgs) -> Result<()> {
    let config = ProcessConfig::from(args);
    let progress = config.progress;

    let summary = process_file(&config).await?;

    progress.finish();
    eprintln!("Done.");
    for line in summary.lines() {
        eprintln!("{}", line);
    }

    println!("{}", serde_json::to_string(&summary)?);

    Ok(())
}

/// Read, transform and write one document
pub async fn process_file(config: &ProcessConfig) -> Result<RunSummary> {
    tracing::debug!(input = %config.input.display(), "reading input file");
    let content = tokio::fs::read_to_string(&config.input)
        .await
        .with_context(|| format!("Failed to read file: {}", config.input.display()))?;

    let fetcher = build_fetcher(&config.fetch).await?;
    let mut resolver = TitleResolver::new(fetcher);
    let mut ctx = RunContext::new(&config.error_log_dir, Local::now(), config.progress);

    let output = process_document(&content, &resolver, &mut ctx).await;

    if let Err(e) = resolver.close().await {
        tracing::warn!(error = %e, "failed to shut down transport");
    }

    tracing::debug!(output = %config.output.display(), "writing output");
    tokio::fs::write(&config.output, output)
        .await
        .with_context(|| format!("Failed to write file: {}", config.output.display()))?;

    Ok(ctx.summary())
}

/// Both passes over an in-memory document. Never fails: resolution errors end
/// up as placeholders in the text and entries in the context's error log.
pub async fn process_document(text: &str, resolver: &TitleResolver, ctx: &mut RunContext) -> String {
    let (separated, inserted) = separate_markers(text);
    ctx.counters.markers_separated += inserted;
    tracing::debug!(inserted, "inserted separators between adjacent footnotes");

    rewrite_footnotes(&separated, resolver, ctx).await
}
