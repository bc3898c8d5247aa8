//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Back up dotfiles, dotfolders and package-manager state.
#[derive(Parser, Debug)]
#[command(
    name = "dbu",
    about = "Back up dotfiles, dotfolders and package lists into a fresh directory",
    version = crate::VERSION
)]
pub struct Cli {
    /// Backup directory; deleted and recreated on every run
    #[arg(short, long, default_value = "backup")]
    pub output: PathBuf,

    /// Configuration file (YAML or TOML) [default: searched]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Debug output, same as -vv
    #[arg(long)]
    pub very_verbose: bool,

    /// Append the run time (-YYYYmmdd-HHMMSS) to the backup directory name
    #[arg(short, long)]
    pub timestamp: bool,

    /// Do not export brew and conda package lists
    #[arg(long)]
    pub skip_exports: bool,

    /// Fail the run when a package export fails instead of warning
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Effective number of `-v` flags.
    #[must_use]
    pub const fn verbosity(&self) -> u8 {
        if self.very_verbose { 2 } else { self.verbose }
    }
}
