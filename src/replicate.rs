//! Tree replicator: copies configured dotfiles and dotfolders from the home
//! directory into a freshly cleaned backup root.
//!
//! A configured name `n` maps `<home>/.n` to `<root>/n`. Names may be nested
//! (`ssh/config`), in which case only the first component gets the dot.
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ReplicateError;
use crate::logging::{EntryStatus, Log};

/// Totals for one [`run_backup`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackupReport {
    /// Dotfiles copied.
    pub files_copied: usize,
    /// Dotfolders copied.
    pub folders_copied: usize,
    /// Dotfiles and dotfolders skipped because they matched the exclude list.
    pub excluded: usize,
}

/// Whether a copy produced output or was filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The entry was copied.
    Copied,
    /// The entry matched the exclude list; nothing was written.
    Excluded,
}

/// Source path of a configured name: `<home>/.<name>`.
#[must_use]
pub fn source_path(home: &Path, name: &str) -> PathBuf {
    home.join(format!(".{name}"))
}

/// Destination path of a configured name: `<root>/<name>`.
#[must_use]
pub fn destination_path(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

fn is_excluded(path: &Path, excluded: &BTreeSet<String>) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| excluded.contains(name))
}

/// Make `path` an existing, empty directory.
///
/// Creates it (and missing ancestors) if absent; otherwise deletes it with
/// all of its contents and recreates it.
///
/// # Errors
///
/// Returns [`ReplicateError::NotADirectory`] if `path` exists but is not a
/// directory, or [`ReplicateError::Io`] if removal or creation fails.
pub fn ensure_clean_directory(path: &Path) -> Result<(), ReplicateError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(path).map_err(ReplicateError::io("remove", path))?;
        }
        Ok(_) => return Err(ReplicateError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ReplicateError::io("inspect", path)(e)),
    }
    fs::create_dir_all(path).map_err(ReplicateError::io("create", path))
}

/// Copy one file, following symlinks, with permissions and timestamps.
///
/// The entry is excluded when the source basename is in `excluded`. The
/// destination's parent is created if missing but never cleared; clearing
/// is [`run_backup`]'s job.
///
/// # Errors
///
/// Returns [`ReplicateError::SourceMissing`] if `source` does not exist (or
/// is a dangling symlink), and [`ReplicateError::Io`] if the copy fails.
pub fn copy_single_file(
    source: &Path,
    destination: &Path,
    excluded: &BTreeSet<String>,
) -> Result<CopyOutcome, ReplicateError> {
    if is_excluded(source, excluded) {
        return Ok(CopyOutcome::Excluded);
    }
    if !source.exists() {
        return Err(ReplicateError::SourceMissing(source.to_path_buf()));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(ReplicateError::io("create", parent))?;
    }
    copy_file_with_metadata(source, destination)?;
    Ok(CopyOutcome::Copied)
}

/// Copy the contents of `source` into a new `destination` tree, leaving out
/// every entry whose basename is in `excluded`.
///
/// Symlinks are followed. `destination` must be absent or an empty
/// directory.
///
/// # Errors
///
/// Returns [`ReplicateError::SourceMissing`] if `source` does not exist,
/// [`ReplicateError::DestinationExists`] if `destination` has content,
/// [`ReplicateError::Walk`] on traversal errors (including symlink loops),
/// and [`ReplicateError::Io`] on copy failures.
pub fn copy_directory_tree(
    source: &Path,
    destination: &Path,
    excluded: &BTreeSet<String>,
) -> Result<CopyOutcome, ReplicateError> {
    if is_excluded(source, excluded) {
        return Ok(CopyOutcome::Excluded);
    }
    if !source.is_dir() {
        return Err(if source.exists() {
            ReplicateError::NotADirectory(source.to_path_buf())
        } else {
            ReplicateError::SourceMissing(source.to_path_buf())
        });
    }
    check_destination_vacant(destination)?;

    let walk_error = |source_err| ReplicateError::Walk {
        path: source.to_path_buf(),
        source: source_err,
    };

    // Directory times are applied last, deepest first, because writing
    // children bumps the parent's mtime.
    let mut directories = Vec::new();

    let walker = WalkDir::new(source)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), excluded));

    for entry in walker {
        let entry = entry.map_err(walk_error)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_or_else(|_| PathBuf::new(), Path::to_path_buf);
        let target = destination.join(&relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(ReplicateError::io("create", &target))?;
            directories.push((entry.path().to_path_buf(), target));
        } else {
            copy_file_with_metadata(entry.path(), &target)?;
        }
    }

    for (src, dst) in directories.iter().rev() {
        copy_metadata(src, dst)?;
    }

    Ok(CopyOutcome::Copied)
}

/// Fail unless `path` is absent or an empty directory.
fn check_destination_vacant(path: &Path) -> Result<(), ReplicateError> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReplicateError::io("inspect", path)(e)),
        Ok(meta) if meta.is_dir() => {
            let mut entries = fs::read_dir(path).map_err(ReplicateError::io("read", path))?;
            if entries.next().is_none() {
                Ok(())
            } else {
                Err(ReplicateError::DestinationExists(path.to_path_buf()))
            }
        }
        Ok(_) => Err(ReplicateError::DestinationExists(path.to_path_buf())),
    }
}

/// Copy bytes, then timestamps through the writing handle, then permission
/// bits. Permissions go last so a read-only source never blocks the
/// timestamp update.
fn copy_file_with_metadata(source: &Path, destination: &Path) -> Result<(), ReplicateError> {
    let meta = fs::metadata(source).map_err(ReplicateError::io("stat", source))?;
    let mut reader = fs::File::open(source).map_err(ReplicateError::io("open", source))?;
    let mut writer =
        fs::File::create(destination).map_err(ReplicateError::io("create", destination))?;
    std::io::copy(&mut reader, &mut writer).map_err(ReplicateError::io("copy", source))?;
    writer
        .set_times(file_times(&meta))
        .map_err(ReplicateError::io("set times on", destination))?;
    drop(writer);
    fs::set_permissions(destination, meta.permissions())
        .map_err(ReplicateError::io("set permissions on", destination))
}

/// Copy timestamps, then permission bits, from one existing directory to
/// another.
fn copy_metadata(source: &Path, destination: &Path) -> Result<(), ReplicateError> {
    let meta = fs::metadata(source).map_err(ReplicateError::io("stat", source))?;
    open_for_times(destination)
        .map_err(ReplicateError::io("open", destination))?
        .set_times(file_times(&meta))
        .map_err(ReplicateError::io("set times on", destination))?;
    fs::set_permissions(destination, meta.permissions())
        .map_err(ReplicateError::io("set permissions on", destination))
}

fn file_times(meta: &fs::Metadata) -> fs::FileTimes {
    let mut times = fs::FileTimes::new();
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    times
}

/// Open a directory so its timestamps can be set.
///
/// Windows needs write access and backup semantics on the handle. Unix
/// refuses to open a directory for writing, but accepts a read handle.
fn open_for_times(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt as _;
        // FILE_FLAG_BACKUP_SEMANTICS
        options.custom_flags(0x0200_0000);
    }
    options.open(path).or_else(|_| fs::File::open(path))
}

/// Back up every configured dotfile and dotfolder from `home` into `root`.
///
/// `root` is cleaned first. Dotfiles are copied in configuration order;
/// nested names create their parent directories but never clear them, so
/// entries sharing an ancestor (`config/git`, `config/nvim/init.lua`) all
/// survive. Dotfolders follow, each destination cleaned and then filled by
/// [`copy_directory_tree`].
///
/// `root` may not lie inside any dotfolder that is going to be copied;
/// that is checked before anything is removed.
///
/// A top-level entry is excluded when either its configured name's basename
/// (`bashrc`) or its source basename (`.bashrc`) is in the exclude list.
///
/// # Errors
///
/// Returns [`ReplicateError::OutputInsideSource`] before touching `root`
/// when it sits inside a dotfolder to be copied. Otherwise returns the
/// first [`ReplicateError`] encountered; the run stops there and whatever
/// was already written stays in place.
pub fn run_backup(
    home: &Path,
    root: &Path,
    config: &Config,
    log: &dyn Log,
) -> Result<BackupReport, ReplicateError> {
    let mut report = BackupReport::default();

    check_root_outside_sources(home, root, config)?;

    log.debug(&format!("cleaning {}", root.display()));
    ensure_clean_directory(root)?;

    if !config.dotfiles.is_empty() {
        log.stage("Copying dotfiles");
    }
    for name in &config.dotfiles {
        let source = source_path(home, name);
        let destination = destination_path(root, name);
        let label = format!("dotfile {name}");

        if is_excluded(&destination, &config.exclude) {
            log.info(&format!("excluded {}", source.display()));
            log.record(&label, EntryStatus::Excluded, None);
            report.excluded += 1;
            continue;
        }

        match copy_single_file(&source, &destination, &config.exclude)? {
            CopyOutcome::Copied => {
                log.info(&format!("copied {}", source.display()));
                log.record(&label, EntryStatus::Copied, None);
                report.files_copied += 1;
            }
            CopyOutcome::Excluded => {
                log.info(&format!("excluded {}", source.display()));
                log.record(&label, EntryStatus::Excluded, None);
                report.excluded += 1;
            }
        }
    }

    if !config.dotfolders.is_empty() {
        log.stage("Copying dotfolders");
    }
    for name in &config.dotfolders {
        let source = source_path(home, name);
        let destination = destination_path(root, name);
        let label = format!("dotfolder {name}");

        if is_excluded(&destination, &config.exclude) || is_excluded(&source, &config.exclude) {
            log.info(&format!("excluded {}", source.display()));
            log.record(&label, EntryStatus::Excluded, None);
            report.excluded += 1;
            continue;
        }

        ensure_clean_directory(&destination)?;
        copy_directory_tree(&source, &destination, &config.exclude)?;
        log.info(&format!("copied {}", source.display()));
        log.record(&label, EntryStatus::Copied, None);
        report.folders_copied += 1;
    }

    Ok(report)
}

/// Fail if `root` is, or lies below, the source of a dotfolder that will be
/// copied. Walking such a source would descend into the backup being
/// written.
fn check_root_outside_sources(
    home: &Path,
    root: &Path,
    config: &Config,
) -> Result<(), ReplicateError> {
    let resolved_root = resolve(root)?;
    for name in &config.dotfolders {
        let source = source_path(home, name);
        let destination = destination_path(root, name);
        if is_excluded(&destination, &config.exclude) || is_excluded(&source, &config.exclude) {
            continue;
        }
        let resolved_source = resolve(&source)?;
        if resolved_root.starts_with(&resolved_source) {
            return Err(ReplicateError::OutputInsideSource {
                output: root.to_path_buf(),
                folder: source,
            });
        }
    }
    Ok(())
}

/// Absolute path with symlinks resolved as far as the path exists: the path
/// itself, else its parent plus the final component, else lexically.
fn resolve(path: &Path) -> Result<PathBuf, ReplicateError> {
    if let Ok(real) = fs::canonicalize(path) {
        return Ok(real);
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && let Ok(real_parent) = fs::canonicalize(parent)
    {
        return Ok(real_parent.join(name));
    }
    std::path::absolute(path).map_err(ReplicateError::io("resolve", path))
}
