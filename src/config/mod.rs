//! Backup configuration: which dotfiles and dotfolders to copy, and which
//! basenames to leave out.
//!
//! The on-disk document is YAML (the historical format) or TOML. Every
//! recognised key is optional; [`RawConfig`] captures the document as
//! written and [`Config::from_raw`] applies the defaults step, so code
//! downstream of loading never has to deal with a missing list.
pub mod loader;

pub use loader::{default_candidates, load, resolve_path};

use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::path::{Component, Path};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::exports;

/// The configuration document exactly as deserialized.
///
/// `null` values and absent keys both land as `None`; unknown keys are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    /// Hidden files under `$HOME`, without the leading dot.
    pub dotfiles: Option<Vec<String>>,
    /// Hidden directories under `$HOME`, without the leading dot.
    pub dotfolders: Option<Vec<String>>,
    /// Basenames skipped wherever they are encountered.
    pub exclude: Option<Vec<String>>,
}

/// Fully-populated backup configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Names of hidden files to copy, in order.
    pub dotfiles: Vec<String>,
    /// Names of hidden directories to copy, in order.
    pub dotfolders: Vec<String>,
    /// Basenames to skip at any depth.
    pub exclude: BTreeSet<String>,
}

/// A non-fatal problem found in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Config key the entry belongs to.
    pub key: &'static str,
    /// The entry in question.
    pub name: String,
    /// Human-readable description.
    pub message: String,
}

impl Config {
    /// Apply defaults to a raw document and validate every entry name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEntry`] if a dotfile or dotfolder name is
    /// empty, absolute, or contains a `..` component.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let config = Self {
            dotfiles: raw.dotfiles.unwrap_or_default(),
            dotfolders: raw.dotfolders.unwrap_or_default(),
            exclude: raw.exclude.unwrap_or_default().into_iter().collect(),
        };

        for name in &config.dotfiles {
            check_entry("dotfiles", name)?;
        }
        for name in &config.dotfolders {
            check_entry("dotfolders", name)?;
        }

        Ok(config)
    }

    /// Returns `true` if nothing would be copied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dotfiles.is_empty() && self.dotfolders.is_empty()
    }

    /// Report suspicious but usable entries.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (key, names) in [("dotfiles", &self.dotfiles), ("dotfolders", &self.dotfolders)] {
            let mut seen = HashSet::new();
            for name in names {
                if name.starts_with('.') {
                    warnings.push(ConfigWarning {
                        key,
                        name: name.clone(),
                        message: format!("names are given without the leading dot; this resolves to '~/.{name}'"),
                    });
                }
                if !seen.insert(name.as_str()) {
                    warnings.push(ConfigWarning {
                        key,
                        name: name.clone(),
                        message: "listed more than once".to_string(),
                    });
                }
            }
        }

        for name in &self.dotfiles {
            if self.dotfolders.contains(name) {
                warnings.push(ConfigWarning {
                    key: "dotfolders",
                    name: name.clone(),
                    message: "also listed under dotfiles; the folder copy replaces the file".to_string(),
                });
            }
        }

        for (key, names) in [("dotfiles", &self.dotfiles), ("dotfolders", &self.dotfolders)] {
            for name in names {
                let top = Path::new(name).components().next().map(Component::as_os_str);
                if let Some(output) = exports::OUTPUTS.iter().find(|o| top == Some(OsStr::new(o))) {
                    warnings.push(ConfigWarning {
                        key,
                        name: name.clone(),
                        message: format!(
                            "collides with the package export '{output}' in the backup root; the export overwrites it"
                        ),
                    });
                }
            }
        }

        warnings
    }
}

/// Reject names that would resolve outside `$HOME` or the backup root.
fn check_entry(key: &'static str, name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidEntry {
        key,
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }

    let path = Path::new(name);
    if path.is_absolute() || path.has_root() {
        return Err(invalid("must be relative to the home directory"));
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(invalid("must not contain '..'"));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn raw(dotfiles: &[&str], dotfolders: &[&str], exclude: &[&str]) -> RawConfig {
        let owned = |v: &[&str]| Some(v.iter().map(ToString::to_string).collect());
        RawConfig {
            dotfiles: owned(dotfiles),
            dotfolders: owned(dotfolders),
            exclude: owned(exclude),
        }
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let config = Config::from_raw(RawConfig::default()).unwrap();
        assert!(config.dotfiles.is_empty());
        assert!(config.dotfolders.is_empty());
        assert!(config.exclude.is_empty());
        assert!(config.is_empty());
    }

    #[test]
    fn keeps_configuration_order() {
        let config = Config::from_raw(raw(&["zshrc", "bashrc"], &["vim", "config"], &[])).unwrap();
        assert_eq!(config.dotfiles, vec!["zshrc", "bashrc"]);
        assert_eq!(config.dotfolders, vec!["vim", "config"]);
    }

    #[test]
    fn exclude_is_deduplicated() {
        let config = Config::from_raw(raw(&[], &[], &["secrets", ".git", "secrets"])).unwrap();
        assert_eq!(config.exclude.len(), 2);
        assert!(config.exclude.contains("secrets"));
    }

    #[test]
    fn nested_names_are_allowed() {
        let config = Config::from_raw(raw(&["ssh/config"], &["config/nvim"], &[])).unwrap();
        assert_eq!(config.dotfiles, vec!["ssh/config"]);
    }

    #[test]
    fn rejects_parent_dir_component() {
        let err = Config::from_raw(raw(&["../etc/passwd"], &[], &[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEntry { key: "dotfiles", .. }
        ));
    }

    #[test]
    fn rejects_absolute_name() {
        let err = Config::from_raw(raw(&[], &["/etc"], &[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEntry {
                key: "dotfolders",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Config::from_raw(raw(&[" "], &[], &[])).is_err());
    }

    #[test]
    fn warns_about_leading_dot() {
        let config = Config::from_raw(raw(&[".bashrc"], &[], &[])).unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].name, ".bashrc");
        assert!(warnings[0].message.contains("leading dot"));
    }

    #[test]
    fn warns_about_duplicates_and_overlap() {
        let config = Config::from_raw(raw(&["vimrc", "vimrc"], &["vimrc"], &[])).unwrap();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.message == "listed more than once"));
        assert!(warnings.iter().any(|w| w.key == "dotfolders"));
    }

    #[test]
    fn warns_about_export_collisions() {
        let config = Config::from_raw(raw(
            &["brew.txt", "conda_backups/base.yml"],
            &["cask.txt"],
            &[],
        ))
        .unwrap();
        let warnings = config.validate();
        let names: Vec<&str> = warnings.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["brew.txt", "conda_backups/base.yml", "cask.txt"]);
        assert!(warnings.iter().all(|w| w.message.contains("package export")));
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let config = Config::from_raw(raw(&["bashrc"], &["config"], &["secrets"])).unwrap();
        assert!(config.validate().is_empty());
    }
}
