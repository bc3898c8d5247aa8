//! Tracing subscriber setup: console formatter and file layer.
//!
//! The subscriber is built explicitly and handed back to the caller, which
//! installs it for the scope of one run with
//! [`tracing::subscriber::with_default`].
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;

use super::utils::format_local_datetime;

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Render an event as `[YYYY-MM-DD HH:MM:SS] LEVEL:target:message`.
fn render(event: &tracing::Event<'_>) -> String {
    let metadata = event.metadata();
    let mut extractor = MessageExtractor::default();
    event.record(&mut extractor);
    format!(
        "[{}] {}:{}:{}",
        format_local_datetime(),
        metadata.level(),
        metadata.target(),
        extractor.message
    )
}

/// A [`tracing_subscriber::Layer`] that appends every event to a log file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path`, write a run header, and return a layer appending to it.
    ///
    /// Returns `None` if the file cannot be written.
    pub(super) fn new(path: &Path) -> Option<Self> {
        let header = format!(
            "==========================================\n\
             devbackup {} {}\n\
             ==========================================\n",
            crate::VERSION,
            format_local_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = render(event);
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] for console output.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", render(event))
    }
}

/// Map the number of `-v` flags to a console level.
///
/// `0` shows warnings and errors, `1` adds info, `2` or more adds debug.
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Build the subscriber for one run.
///
/// Console output goes to stdout at `console_level`. When `log_file` is
/// given and writable, every event at `DEBUG` and above is also appended
/// there, regardless of the console level.
pub fn build_subscriber(
    console_level: LevelFilter,
    log_file: Option<&Path>,
) -> impl tracing::Subscriber + Send + Sync + 'static + use<> {
    use tracing_subscriber::{Layer as _, fmt, layer::SubscriberExt as _};

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(std::io::stdout)
        .with_filter(console_level);

    let file_layer = log_file
        .and_then(FileLayer::new)
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::WARN);
        assert_eq!(level_for_verbosity(1), LevelFilter::INFO);
        assert_eq!(level_for_verbosity(2), LevelFilter::DEBUG);
        assert_eq!(level_for_verbosity(7), LevelFilter::DEBUG);
    }

    #[test]
    fn file_layer_writes_header_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.log");
        let subscriber = build_subscriber(LevelFilter::OFF, Some(&path));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "devbackup::test", "copied bashrc");
            tracing::warn!("brew not found");
        });

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("devbackup "), "header missing: {contents}");
        assert!(contents.contains("DEBUG:devbackup::test:copied bashrc"));
        assert!(contents.contains("WARN:"));
        assert!(contents.contains(":brew not found"));
    }

    #[test]
    fn unwritable_log_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("backup.log");
        let subscriber = build_subscriber(LevelFilter::OFF, Some(&path));
        tracing::subscriber::with_default(subscriber, || tracing::info!("still works"));
        assert!(!path.exists());
    }
}
