//! Homebrew formula and cask lists.
use std::path::Path;

use super::{settle, write_export};
use crate::error::BackupError;
use crate::exec::{self, Executor};
use crate::logging::{EntryStatus, Log};

/// Output file and `brew` arguments for each list.
pub const LISTS: [(&str, &[&str]); 2] = [
    ("brew.txt", &["list", "--formula"]),
    ("cask.txt", &["list", "--cask"]),
];

/// Write `brew.txt` and `cask.txt` into `root`.
///
/// # Errors
///
/// Returns an error if a file cannot be written, or with `strict` if a
/// `brew` invocation fails.
pub fn export(
    executor: &dyn Executor,
    root: &Path,
    strict: bool,
    log: &dyn Log,
) -> Result<(), BackupError> {
    for (file, args) in LISTS {
        let result = exec::capture(executor, "brew", args);
        let clean = result.is_ok();
        let Some(stdout) = settle(result, file, strict, log)? else {
            continue;
        };
        let path = root.join(file);
        write_export(&path, &stdout)?;
        log.info(&format!("wrote {}", path.display()));
        if clean {
            log.record(file, EntryStatus::Exported, None);
        }
    }
    Ok(())
}
