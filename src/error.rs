//! Domain-specific error types for the backup engine.
//!
//! Library modules return typed errors ([`ConfigError`], [`ReplicateError`],
//! [`ExecError`]) while the command handler at the CLI boundary converts them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! BackupError
//! ├── Config(ConfigError)       — locating, reading and parsing the config
//! ├── Replicate(ReplicateError) — copying files and directory trees
//! └── Exec(ExecError)           — external package-manager commands
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the backup engine.
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration could not be located, read, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A filesystem operation of the tree replicator failed.
    #[error("Copy error: {0}")]
    Replicate(#[from] ReplicateError),

    /// An external command failed.
    #[error("Command error: {0}")]
    Exec(#[from] ExecError),
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No `--config` was given and no default config file exists.
    #[error("No config file given and none found in: {}", format_candidates(.searched))]
    NotFound {
        /// Locations that were checked, in order.
        searched: Vec<PathBuf>,
    },

    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid YAML or TOML for the expected shape.
    #[error("Invalid config syntax in {}: {message}", .path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// An entry name would resolve outside the home directory or backup root.
    #[error("Invalid {key} entry '{name}': {reason}")]
    InvalidEntry {
        /// Config key holding the entry (`dotfiles`, `dotfolders`).
        key: &'static str,
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

fn format_candidates(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that arise while replicating files and directories.
#[derive(Error, Debug)]
pub enum ReplicateError {
    /// The source of a copy does not exist.
    #[error("Source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// A path expected to be a directory exists as something else.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A tree copy was asked to write into a destination that already has content.
    #[error("Destination already exists and is not empty: {}", .0.display())]
    DestinationExists(PathBuf),

    /// The backup root lies inside a dotfolder that is about to be copied.
    #[error(
        "Backup directory {} lies inside the backed-up folder {}",
        .output.display(),
        .folder.display()
    )]
    OutputInsideSource {
        /// The backup root.
        output: PathBuf,
        /// The dotfolder source containing it.
        folder: PathBuf,
    },

    /// An underlying filesystem call failed.
    #[error("Failed to {op} {}: {source}", .path.display())]
    Io {
        /// Short description of the attempted operation (e.g. `"copy"`).
        op: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Directory traversal failed (unreadable entry, symlink loop).
    #[error("Failed to walk {}: {source}", .path.display())]
    Walk {
        /// Root of the traversal.
        path: PathBuf,
        /// Underlying traversal error.
        source: walkdir::Error,
    },
}

impl ReplicateError {
    /// Build a closure that wraps an [`std::io::Error`] for `op` on `path`.
    pub(crate) fn io(
        op: &'static str,
        path: &std::path::Path,
    ) -> impl FnOnce(std::io::Error) -> Self + use<> {
        let path = path.to_path_buf();
        move |source| Self::Io { op, path, source }
    }
}

/// Errors that arise from running an external command.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The executable is not on `PATH`.
    #[error("Executable not found: {program}")]
    NotFound {
        /// Name of the missing program.
        program: String,
    },

    /// The process could not be started.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The process exited with a non-zero status.
    #[error("{command} failed (exit {}): {}", .code.unwrap_or(-1), .stderr.trim())]
    Failed {
        /// Command line that was run.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
        /// Captured standard output, which may still be useful.
        stdout: String,
    },
}
