//! Core logging types: summary entries, status, and the [`Log`] trait.

/// One line of the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    /// What was processed (e.g. `dotfile bashrc`, `brew.txt`).
    pub name: String,
    /// Outcome.
    pub status: EntryStatus,
    /// Optional detail (e.g. the reason something was skipped).
    pub message: Option<String>,
}

/// Outcome of a single backup item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// A dotfile or dotfolder was copied.
    Copied,
    /// The item matched the exclude list.
    Excluded,
    /// A package-manager export was written.
    Exported,
    /// The item was skipped (tool not installed, exports disabled).
    Skipped,
    /// The item failed but the run continued.
    Failed,
}

impl EntryStatus {
    /// Short lowercase label used in the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Excluded => "excluded",
            Self::Exported => "exported",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// The backup code only ever talks to this trait; [`Logger`](super::Logger)
/// is the production implementation.
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message.
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an item result for the summary.
    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let all = [
            EntryStatus::Copied,
            EntryStatus::Excluded,
            EntryStatus::Exported,
            EntryStatus::Skipped,
            EntryStatus::Failed,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), all.len());
    }
}
