//! Command-line entry point for devbackup.

use anyhow::Result;
use clap::Parser;

use devbackup::logging::Log as _;
use devbackup::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let log_file = logging::log_file_path("backup");
    let subscriber = logging::build_subscriber(
        logging::level_for_verbosity(args.verbosity()),
        log_file.as_deref(),
    );
    let log = logging::Logger::new(log_file);

    tracing::subscriber::with_default(subscriber, || {
        let result = commands::backup::run(&args, &log);
        if let Err(e) = &result {
            log.error(&format!("{e:#}"));
        }
        result
    })
}
