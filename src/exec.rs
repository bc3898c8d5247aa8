//! External command execution.
//!
//! All package-manager queries go through the [`Executor`] trait so the
//! export logic can be tested without `brew` or `conda` installed.
use std::process::{Command, Output};

use crate::error::ExecError;

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
pub trait Executor: std::fmt::Debug {
    /// Run `program` with `args` and return its output whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> std::io::Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> std::io::Result<ExecResult> {
        Command::new(program)
            .args(args)
            .output()
            .map(ExecResult::from)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Run a command and return its standard output.
///
/// # Errors
///
/// - [`ExecError::NotFound`] if `program` is not on `PATH`.
/// - [`ExecError::Spawn`] if the process cannot be started.
/// - [`ExecError::Failed`] if it exits non-zero; the error still carries the
///   captured stdout so callers may keep it.
pub fn capture(executor: &dyn Executor, program: &str, args: &[&str]) -> Result<String, ExecError> {
    if !executor.which(program) {
        return Err(ExecError::NotFound {
            program: program.to_string(),
        });
    }

    let result = executor
        .run_unchecked(program, args)
        .map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if result.success {
        Ok(result.stdout)
    } else {
        Err(ExecError::Failed {
            command: command_line(program, args),
            code: result.code,
            stderr: result.stderr,
            stdout: result.stdout,
        })
    }
}

/// Render `program` and `args` as a single space-separated string.
#[must_use]
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
