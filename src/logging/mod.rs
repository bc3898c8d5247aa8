//! Logging infrastructure: explicitly built tracing subscriber, the [`Log`]
//! trait, and the summary-collecting [`Logger`].

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{build_subscriber, level_for_verbosity};
pub use types::{EntryStatus, Log, SummaryEntry};
pub use utils::log_file_path;
