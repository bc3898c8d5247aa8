//! The backup command: resolve paths, copy the configured entries, run the
//! package exports and print the summary.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Local};

use crate::cli::Cli;
use crate::config;
use crate::exec::{Executor, SystemExecutor};
use crate::exports::{self, ExportOptions};
use crate::logging::{Log as _, Logger};
use crate::replicate::{self, BackupReport};

/// Everything a backup run needs, resolved from the command line and the
/// environment.
#[derive(Debug, Clone)]
pub struct BackupPlan {
    /// Home directory holding the dotfiles.
    pub home: PathBuf,
    /// Configuration file to load.
    pub config: PathBuf,
    /// Backup root; wiped and recreated.
    pub output: PathBuf,
    /// Export behaviour.
    pub exports: ExportOptions,
}

/// Run the backup command.
///
/// # Errors
///
/// Returns an error if the home directory or configuration cannot be
/// resolved, or if the backup itself fails.
pub fn run(cli: &Cli, log: &Logger) -> Result<()> {
    let plan = resolve_plan(cli, Local::now())?;
    execute(&plan, &SystemExecutor, log)?;
    Ok(())
}

/// Resolve paths from `cli` and the process environment.
///
/// # Errors
///
/// Returns an error if the home or current directory is unknown, or no
/// configuration file can be found.
pub fn resolve_plan(cli: &Cli, now: DateTime<Local>) -> Result<BackupPlan> {
    let home = home_dir()?;
    let cwd = std::env::current_dir().context("determining the current directory")?;
    let config_home =
        std::env::var_os("XDG_CONFIG_HOME").map_or_else(|| home.join(".config"), PathBuf::from);

    let candidates = config::default_candidates(Some(&config_home), &cwd);
    let config = config::resolve_path(cli.config.as_deref(), candidates)?;

    let output = output_dir(&cwd.join(&cli.output), cli.timestamp.then_some(now));

    Ok(BackupPlan {
        home,
        config,
        output,
        exports: ExportOptions {
            skip: cli.skip_exports,
            strict: cli.strict,
        },
    })
}

/// Load the configuration, replicate the tree, run the exports and log the
/// summary.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the output
/// directory is unsafe to wipe, a copy fails, or a strict export fails.
pub fn execute(plan: &BackupPlan, executor: &dyn Executor, log: &Logger) -> Result<BackupReport> {
    log.info(&format!("devbackup {}", crate::VERSION));

    log.stage("Loading configuration");
    let config = config::load(&plan.config)?;
    log.info(&format!("config: {}", plan.config.display()));
    log.debug(&format!("{} dotfiles", config.dotfiles.len()));
    log.debug(&format!("{} dotfolders", config.dotfolders.len()));
    log.debug(&format!("{} exclusions", config.exclude.len()));

    let warnings = config.validate();
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!(
                "  {} [{}]: {}",
                warning.key, warning.name, warning.message
            ));
        }
    }
    if config.is_empty() {
        log.warn("configuration lists no dotfiles or dotfolders");
    }

    check_output(&plan.output, &plan.home)?;
    log.info(&format!(
        "backing up {} into {}",
        plan.home.display(),
        plan.output.display()
    ));

    let report = replicate::run_backup(&plan.home, &plan.output, &config, log)
        .with_context(|| format!("backing up into {}", plan.output.display()))?;
    log.info(&format!(
        "copied {} dotfile(s) and {} dotfolder(s), {} excluded",
        report.files_copied, report.folders_copied, report.excluded
    ));

    exports::run_exports(executor, &plan.output, plan.exports, log)
        .context("exporting package lists")?;

    log.print_summary();
    Ok(report)
}

/// Resolve the home directory from `HOME`, falling back to `USERPROFILE`.
///
/// # Errors
///
/// Returns an error if neither variable is set.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .context("cannot determine the home directory: neither HOME nor USERPROFILE is set")
}

/// Append `-YYYYmmdd-HHMMSS` to the last component of `base` when a
/// timestamp is given.
#[must_use]
pub fn output_dir(base: &Path, timestamp: Option<DateTime<Local>>) -> PathBuf {
    let Some(ts) = timestamp else {
        return base.to_path_buf();
    };
    let suffix = ts.format("%Y%m%d-%H%M%S");
    match base.file_name() {
        Some(name) => base.with_file_name(format!("{}-{suffix}", name.to_string_lossy())),
        None => base.join(format!("backup-{suffix}")),
    }
}

/// Refuse to wipe the home directory or anything containing it.
fn check_output(output: &Path, home: &Path) -> Result<()> {
    let output = std::path::absolute(output)
        .with_context(|| format!("resolving {}", output.display()))?;
    let home = std::path::absolute(home).with_context(|| format!("resolving {}", home.display()))?;
    if home.starts_with(&output) {
        bail!(
            "refusing to use {} as the backup directory: it contains the home directory {}",
            output.display(),
            home.display()
        );
    }
    Ok(())
}
