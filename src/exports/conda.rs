//! Conda environment exports, one YAML file per named environment.
use std::path::Path;

use super::{settle, write_export};
use crate::error::BackupError;
use crate::exec::{self, Executor};
use crate::logging::{EntryStatus, Log};
use crate::replicate::ensure_clean_directory;

/// Directory under the backup root holding the environment files.
pub const BACKUP_DIR: &str = "conda_backups";

/// Extract environment names from `conda env list` output.
///
/// Comment and blank lines are skipped and the first column is taken. Rows
/// for environments without a name start with their path and are skipped,
/// as is the `*` marker of an unnamed active environment.
#[must_use]
pub fn parse_env_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| *name != "*" && !is_path(name))
        .map(String::from)
        .collect()
}

fn is_path(token: &str) -> bool {
    token.contains('/') || token.contains('\\') || Path::new(token).is_absolute()
}

/// Drop the last two lines of `conda env export` output.
///
/// They are the machine-specific `prefix:` line and the empty string after
/// the final newline, so the result has no trailing newline.
#[must_use]
pub fn strip_prefix_trailer(export: &str) -> String {
    let lines: Vec<&str> = export.split('\n').collect();
    let keep = lines.len().saturating_sub(2);
    lines.iter().take(keep).copied().collect::<Vec<_>>().join("\n")
}

/// Export every named environment to `<root>/conda_backups/<env>.yml`.
///
/// # Errors
///
/// Returns an error if the output directory or a file cannot be written,
/// or with `strict` if a `conda` invocation fails.
pub fn export(
    executor: &dyn Executor,
    root: &Path,
    strict: bool,
    log: &dyn Log,
) -> Result<(), BackupError> {
    let listing = exec::capture(executor, "conda", &["env", "list"]);
    let Some(listing) = settle(listing, "conda env list", strict, log)? else {
        return Ok(());
    };

    let envs = parse_env_list(&listing);
    log.debug(&format!("conda environments: {}", envs.join(", ")));

    let dir = root.join(BACKUP_DIR);
    ensure_clean_directory(&dir)?;

    for env in &envs {
        let name = format!("{BACKUP_DIR}/{env}.yml");
        let result = exec::capture(executor, "conda", &["env", "export", "-n", env.as_str()]);
        let clean = result.is_ok();
        let Some(stdout) = settle(result, &name, strict, log)? else {
            continue;
        };
        let path = dir.join(format!("{env}.yml"));
        write_export(&path, &strip_prefix_trailer(&stdout))?;
        log.info(&format!("wrote {}", path.display()));
        if clean {
            log.record(&name, EntryStatus::Exported, None);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;
    use crate::logging::Logger;
    use std::fs;

    const ENV_LIST: &str = "\
# conda environments:
#
base                  *  /opt/miniconda3
datasci                  /opt/miniconda3/envs/datasci
                         /home/me/projects/scratch/.env
web                      /opt/miniconda3/envs/web

";

    const EXPORT: &str = "\
name: datasci
channels:
  - conda-forge
dependencies:
  - numpy=1.26.4
  - python=3.11.8
prefix: /opt/miniconda3/envs/datasci
";

    #[test]
    fn parse_env_list_takes_named_environments() {
        assert_eq!(parse_env_list(ENV_LIST), vec!["base", "datasci", "web"]);
    }

    #[test]
    fn parse_env_list_empty_output() {
        assert!(parse_env_list("").is_empty());
        assert!(parse_env_list("# conda environments:\n#\n\n").is_empty());
    }

    #[test]
    fn parse_env_list_skips_unnamed_active_env() {
        assert_eq!(parse_env_list("  *  /tmp/env\nbase  /opt/conda\n"), vec!["base"]);
    }

    #[test]
    fn strip_prefix_trailer_drops_prefix_line() {
        insta::assert_snapshot!(strip_prefix_trailer(EXPORT), @r"
        name: datasci
        channels:
          - conda-forge
        dependencies:
          - numpy=1.26.4
          - python=3.11.8
        ");
    }

    #[test]
    fn strip_prefix_trailer_short_input() {
        assert_eq!(strip_prefix_trailer(""), "");
        assert_eq!(strip_prefix_trailer("prefix: /x\n"), "");
        assert_eq!(strip_prefix_trailer("a\nb\nc"), "a");
    }

    #[test]
    fn export_writes_one_file_per_env() {
        let tmp = tempfile::tempdir().unwrap();
        let stale = tmp.path().join(BACKUP_DIR).join("old.yml");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        let executor = MockExecutor::new()
            .ok(ENV_LIST)
            .ok("name: base\nprefix: /opt/miniconda3\n")
            .ok(EXPORT)
            .ok("name: web\nprefix: /opt/miniconda3/envs/web\n");
        let log = Logger::default();

        export(&executor, tmp.path(), false, &log).unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "conda env list",
                "conda env export -n base",
                "conda env export -n datasci",
                "conda env export -n web",
            ]
        );
        let dir = tmp.path().join(BACKUP_DIR);
        assert!(!stale.exists(), "previous exports are discarded");
        assert_eq!(fs::read_to_string(dir.join("base.yml")).unwrap(), "name: base");
        assert!(
            fs::read_to_string(dir.join("datasci.yml"))
                .unwrap()
                .ends_with("- python=3.11.8")
        );
        assert_eq!(log.count(EntryStatus::Exported), 3);
    }

    #[test]
    fn missing_conda_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = MockExecutor::new().without("conda");
        let log = Logger::default();

        export(&executor, tmp.path(), false, &log).unwrap();
        assert!(!tmp.path().join(BACKUP_DIR).exists());
        assert_eq!(log.count(EntryStatus::Skipped), 1);
    }

    #[test]
    fn failed_env_export_continues_with_next() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = MockExecutor::new()
            .ok("a  /envs/a\nb  /envs/b\n")
            .fail("", "EnvironmentLocationNotFound")
            .ok("name: b\nprefix: /envs/b\n");
        let log = Logger::default();

        export(&executor, tmp.path(), false, &log).unwrap();
        let dir = tmp.path().join(BACKUP_DIR);
        assert_eq!(fs::read_to_string(dir.join("a.yml")).unwrap(), "");
        assert_eq!(fs::read_to_string(dir.join("b.yml")).unwrap(), "name: b");
        assert_eq!(log.count(EntryStatus::Failed), 1);
        assert_eq!(log.count(EntryStatus::Exported), 1);
    }
}
