//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{EntryStatus, Log, SummaryEntry};

/// Logger handed explicitly to the backup code.
///
/// Messages are emitted as [`tracing`] events under the `devbackup` target,
/// so where they end up is decided by the subscriber the caller installed.
/// Item results are collected for [`print_summary`](Self::print_summary).
#[derive(Debug, Default)]
pub struct Logger {
    entries: Mutex<Vec<SummaryEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger. `log_file` is only reported in the summary.
    #[must_use]
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Record an item result for the summary.
    pub fn record(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(SummaryEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a copy of every recorded entry.
    #[must_use]
    pub fn entries(&self) -> Vec<SummaryEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the recorded entries with `status`.
    #[must_use]
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries
            .lock()
            .map_or(0, |guard| guard.iter().filter(|e| e.status == status).count())
    }

    /// Log the summary of all recorded entries.
    ///
    /// Individual entries are logged at debug level, the totals at info,
    /// and any failures additionally at warn.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &entries {
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.debug(&format!("{:>8} {}{suffix}", entry.status.label(), entry.name));
        }

        let totals = format!(
            "{} copied, {} exported, {} excluded, {} skipped, {} failed",
            self.count(EntryStatus::Copied),
            self.count(EntryStatus::Exported),
            self.count(EntryStatus::Excluded),
            self.count(EntryStatus::Skipped),
            self.count(EntryStatus::Failed),
        );
        if self.count(EntryStatus::Failed) > 0 {
            self.warn(&totals);
        } else {
            self.info(&totals);
        }

        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: "devbackup::stage", "==> {msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!(target: "devbackup", "{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!(target: "devbackup", "{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "devbackup", "{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "devbackup", "{msg}");
    }

    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        Self::record(self, name, status, message);
    }
}
