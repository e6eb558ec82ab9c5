//! Run counters, progress line and final summary

use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Monotonic counters for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub markers_separated: usize,
    pub footnotes_seen: usize,
    pub links_resolved: usize,
    pub errors: usize,
}

/// Final, immutable outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub separators_inserted: usize,
    pub footnotes_rewritten: usize,
    pub errors: usize,
    /// Present only when at least one error was logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,
}

impl RunCounters {
    /// `error_log` is the log file, if one was actually written
    pub fn summary(&self, error_log: Option<PathBuf>) -> RunSummary {
        RunSummary {
            separators_inserted: self.markers_separated,
            footnotes_rewritten: self.links_resolved,
            errors: self.errors,
            error_log: error_log.filter(|_| self.errors > 0),
        }
    }
}

/// How progress is shown while footnotes resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Redraw one status line on stderr
    Line,
    /// Nothing on the terminal; `tracing` debug events carry the detail
    Quiet,
}

impl Progress {
    pub fn report(&self, counters: &RunCounters) {
        if *self == Progress::Line {
            eprint!("\r{}", progress_line(counters));
            let _ = std::io::stderr().flush();
        }
    }

    /// Terminate the status line before anything else is printed
    pub fn finish(&self) {
        if *self == Progress::Line {
            eprintln!();
        }
    }
}

pub fn progress_line(counters: &RunCounters) -> String {
    format!(
        "Processed footnotes: {}, links: {}, errors: {}",
        counters.footnotes_seen, counters.links_resolved, counters.errors
    )
}

impl RunSummary {
    /// Human-readable summary lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Summary:".to_string(),
            format!(" - Footnote commas inserted: {}", self.separators_inserted),
            format!(" - Footnote links updated: {}", self.footnotes_rewritten),
            format!(" - Errors encountered: {}", self.errors),
        ];
        if let Some(path) = &self.error_log {
            lines.push(format!(" - Errors logged to: {}", path.display()));
        }
        lines
    }
}
