//! Locating and parsing the configuration document.
use std::path::{Path, PathBuf};

use super::{Config, RawConfig};
use crate::error::ConfigError;

/// Extensions probed, in order, in each default location.
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "toml"];

/// Document formats understood by [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML, used for any extension other than `.toml`.
    Yaml,
    /// TOML.
    Toml,
}

impl Format {
    /// Pick the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Read and parse the configuration at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read,
/// [`ConfigError::Parse`] if it is not a valid document, and
/// [`ConfigError::InvalidEntry`] if an entry name is unusable.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, Format::from_path(path), path)
}

/// Parse `content` in the given format. `origin` is only used in errors.
///
/// # Errors
///
/// See [`load`].
pub fn parse(content: &str, format: Format, origin: &Path) -> Result<Config, ConfigError> {
    // An empty YAML stream is not a mapping; treat it like an empty one.
    if content.trim().is_empty() {
        return Config::from_raw(RawConfig::default());
    }

    let parse_error = |message: String| ConfigError::Parse {
        path: origin.to_path_buf(),
        message,
    };

    let raw: RawConfig = match format {
        Format::Yaml => serde_yaml::from_str::<Option<RawConfig>>(content)
            .map_err(|e| parse_error(e.to_string()))?
            .unwrap_or_default(),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.message().to_string()))?,
    };

    Config::from_raw(raw)
}

/// Default config locations, in lookup order.
///
/// `config_home` is `$XDG_CONFIG_HOME` (or `~/.config`); `cwd` is the
/// directory the tool was started from.
#[must_use]
pub fn default_candidates(config_home: Option<&Path>, cwd: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = config_home {
        let dir = dir.join("devbackup");
        candidates.extend(EXTENSIONS.iter().map(|ext| dir.join(format!("config.{ext}"))));
    }
    candidates.extend(EXTENSIONS.iter().map(|ext| cwd.join(format!("devbackup.{ext}"))));
    candidates
}

/// Use `explicit` if given, otherwise the first existing default location.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if no `explicit` path was given and none
/// of the candidates exist.
pub fn resolve_path(explicit: Option<&Path>, candidates: Vec<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(ConfigError::NotFound {
            searched: candidates,
        }),
    }
}
