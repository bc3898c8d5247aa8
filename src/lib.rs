//! Dotfile backup engine.
//!
//! Copies a configured set of dotfiles and dotfolders from the home
//! directory into a freshly recreated backup directory, then exports
//! Homebrew and conda package state next to them.
//!
//! - **[`config`]**: load the YAML or TOML configuration
//! - **[`replicate`]**: clean the backup root and copy trees with exclusions
//! - **[`exports`]**: save package-manager output via an [`exec::Executor`]
//! - **[`commands`]**: the `backup` command wiring everything together
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod exports;
pub mod logging;
pub mod replicate;

/// Version string, from `git describe` at build time when available.
pub const VERSION: &str = match option_env!("DEVBACKUP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
