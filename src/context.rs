//! Per-run state threaded through every pass
//!
//! Owned by whoever drives the run; nothing here outlives one invocation.

use crate::error_log::{ErrorEntry, ErrorLog};
use crate::stats::{Progress, RunCounters, RunSummary};
use chrono::{DateTime, Local, NaiveDate};
use std::path::Path;

pub struct RunContext {
    pub counters: RunCounters,
    pub error_log: ErrorLog,
    /// Date stamped into every rewritten footnote
    pub retrieved_on: NaiveDate,
    pub progress: Progress,
}

impl RunContext {
    /// Context for a run that started at `started`; the error log, if any,
    /// lands in `log_dir`
    pub fn new(log_dir: &Path, started: DateTime<Local>, progress: Progress) -> Self {
        Self {
            counters: RunCounters::default(),
            error_log: ErrorLog::new(log_dir, &started),
            retrieved_on: started.date_naive(),
            progress,
        }
    }

    /// `YYYY-MM-DD`
    pub fn retrieved_on_str(&self) -> String {
        self.retrieved_on.format("%Y-%m-%d").to_string()
    }

    /// Count a failure and log it. A log write failure is reported, never raised.
    pub async fn record_error(&mut self, entry: ErrorEntry) {
        self.counters.errors += 1;
        if let Err(e) = self.error_log.append(entry).await {
            tracing::warn!(
                path = %self.error_log.path().display(),
                error = %e,
                "failed to write error log"
            );
        }
    }

    pub fn report_progress(&self) {
        self.progress.report(&self.counters);
    }

    /// Points at the error log only if the file was written
    pub fn summary(&self) -> RunSummary {
        let log = self
            .error_log
            .is_created()
            .then(|| self.error_log.path().to_path_buf());
        self.counters.summary(log)
    }
}
