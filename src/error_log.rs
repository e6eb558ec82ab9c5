//! Append-only error log for one run
//!
//! The file is named after the run's start time and only created when the
//! first failure is recorded. Each entry goes out in a single write.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// One failed resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub url: String,
    /// Definition text before any rewrite
    pub footnote: String,
    pub reason: String,
}

impl ErrorEntry {
    fn render(&self) -> String {
        format!(
            "Error retrieving title from {}: {}\nOriginal footnote: {}\n\n",
            self.url, self.reason, self.footnote
        )
    }
}

#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    file: Option<File>,
    entries: Vec<ErrorEntry>,
}

/// `errors-YYYY-MM-DD-HH-MM.txt`
pub fn log_file_name(started: &DateTime<Local>) -> String {
    format!("errors-{}.txt", started.format("%Y-%m-%d-%H-%M"))
}

impl ErrorLog {
    pub fn new(dir: &Path, started: &DateTime<Local>) -> Self {
        Self {
            path: dir.join(log_file_name(started)),
            file: None,
            entries: Vec::new(),
        }
    }

    /// Record an entry in memory and append it to the file.
    ///
    /// The in-memory record is kept even when the write fails.
    pub async fn append(&mut self, entry: ErrorEntry) -> std::io::Result<()> {
        let rendered = entry.render();
        self.entries.push(entry);

        let file = match self.file.take() {
            Some(file) => file,
            None => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await?;
                tracing::debug!(path = %self.path.display(), "error log created");
                file
            }
        };
        let file = self.file.insert(file);

        file.write_all(rendered.as_bytes()).await?;
        file.flush().await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Whether the file exists on disk yet
    pub fn is_created(&self) -> bool {
        self.file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn started() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap()
    }

    fn entry(url: &str) -> ErrorEntry {
        ErrorEntry {
            url: url.to_string(),
            footnote: format!("[^1]: {}", url),
            reason: "timed out after 10000ms".to_string(),
        }
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name(&started()), "errors-2025-03-09-14-05.txt");
    }

    #[tokio::test]
    async fn test_lazy_creation() {
        let dir = tempdir().unwrap();
        let mut log = ErrorLog::new(dir.path(), &started());
        assert!(!log.path().exists());
        assert!(!log.is_created());

        log.append(entry("https://a.example")).await.unwrap();
        assert!(log.path().exists());
        assert!(log.is_created());
    }

    #[tokio::test]
    async fn test_entries_appended_in_order() {
        let dir = tempdir().unwrap();
        let mut log = ErrorLog::new(dir.path(), &started());
        log.append(entry("https://a.example")).await.unwrap();
        log.append(entry("https://b.example")).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "Error retrieving title from https://a.example: timed out after 10000ms\n\
             Original footnote: [^1]: https://a.example\n\n\
             Error retrieving title from https://b.example: timed out after 10000ms\n\
             Original footnote: [^1]: https://b.example\n\n"
        );
        assert_eq!(log.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_entry() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut log = ErrorLog::new(&missing, &started());
        assert!(log.append(entry("https://a.example")).await.is_err());
        assert_eq!(log.entries().len(), 1);
    }
}
