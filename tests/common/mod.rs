// Shared helpers for integration tests.
//
// Provides an isolated home directory, working directory and cache
// directory plus a fluent builder, so each integration test can set up a
// backup scenario without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use devbackup::config::{self, Config};

/// An isolated backup environment backed by [`tempfile::TempDir`]s.
///
/// The directories are deleted when the context is dropped.
pub struct IntegrationTestContext {
    /// Fake home directory holding the dotfiles.
    pub home: tempfile::TempDir,
    /// Working directory holding the config and the backup output.
    pub work: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with an empty home and an empty config.
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("create home dir");
        let work = tempfile::tempdir().expect("create work dir");
        std::fs::write(work.path().join("devbackup.yaml"), "").expect("write config");
        Self { home, work }
    }

    /// Path to the fake home directory.
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.work.path().join("devbackup.yaml")
    }

    /// Default backup root.
    pub fn output_path(&self) -> PathBuf {
        self.work.path().join("backup")
    }

    /// Load the config file through the library loader.
    pub fn load_config(&self) -> Config {
        config::load(&self.config_path()).expect("load config")
    }

    /// A `dbu` command isolated from the real home, config and cache.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_dbu"));
        cmd.current_dir(self.work.path())
            .env("HOME", self.home.path())
            .env("USERPROFILE", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("XDG_CACHE_HOME", self.work.path().join("cache"));
        cmd
    }

    /// Run `dbu` with `args` and return its output.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("spawn dbu")
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Replace the config file with `content` (YAML).
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(self.ctx.config_path(), content).expect("write config");
        self
    }

    /// Write `<home>/.<name>` with `content`, creating parents.
    pub fn with_dotfile(self, name: &str, content: &str) -> Self {
        let path = self.ctx.home.path().join(format!(".{name}"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dotfile parent");
        }
        std::fs::write(&path, content).expect("write dotfile");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// Sorted relative paths of everything below `dir`.
pub fn tree(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .map(|e| {
            let e = e.expect("walk");
            e.path()
                .strip_prefix(dir)
                .expect("strip prefix")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    names.sort();
    names
}
