//! Package-manager exports written next to the copied dotfiles.
//!
//! Every export is one external command whose standard output is saved
//! under the backup root. Commands run strictly one after another.
pub mod brew;
pub mod conda;

use std::fs;
use std::path::Path;

use crate::error::{BackupError, ExecError, ReplicateError};
use crate::exec::Executor;
use crate::logging::{EntryStatus, Log};

/// Top-level names the exports write into the backup root.
pub const OUTPUTS: [&str; 3] = ["brew.txt", "cask.txt", conda::BACKUP_DIR];

/// How export failures are handled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Do not run any export.
    pub skip: bool,
    /// Abort on the first failed export instead of warning.
    pub strict: bool,
}

/// Run every export into `root`.
///
/// # Errors
///
/// Returns an error if an export file cannot be written, or, with
/// [`ExportOptions::strict`], if any export command fails.
pub fn run_exports(
    executor: &dyn Executor,
    root: &Path,
    options: ExportOptions,
    log: &dyn Log,
) -> Result<(), BackupError> {
    if options.skip {
        log.debug("exports disabled");
        return Ok(());
    }

    log.stage("Exporting packages");
    brew::export(executor, root, options.strict, log)?;
    conda::export(executor, root, options.strict, log)?;
    Ok(())
}

/// Apply the failure policy to one command result.
///
/// A missing executable is skipped and a non-zero exit keeps whatever stdout
/// the command produced. Both only warn unless `strict` is set, in which
/// case the error is returned.
pub(crate) fn settle(
    result: Result<String, ExecError>,
    name: &str,
    strict: bool,
    log: &dyn Log,
) -> Result<Option<String>, ExecError> {
    let err = match result {
        Ok(stdout) => return Ok(Some(stdout)),
        Err(err) => err,
    };

    let (status, kept) = match &err {
        ExecError::NotFound { .. } => (EntryStatus::Skipped, None),
        ExecError::Failed { stdout, .. } => (EntryStatus::Failed, Some(stdout.clone())),
        ExecError::Spawn { .. } => (EntryStatus::Failed, None),
    };

    if strict {
        log.error(&format!("{name}: {err}"));
        log.record(name, EntryStatus::Failed, Some(&err.to_string()));
        return Err(err);
    }

    log.warn(&format!("{name}: {err}"));
    log.record(name, status, Some(&err.to_string()));
    Ok(kept)
}

/// Write an export file.
pub(crate) fn write_export(path: &Path, contents: &str) -> Result<(), ReplicateError> {
    fs::write(path, contents).map_err(ReplicateError::io("write", path))
}
