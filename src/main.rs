mod cli;
mod execute;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use crate::cli::CLI;
use anyhow::Result;

/// Environment variable holding a `tracing` filter, e.g. `DEVENGINES_LOG=debug`.
const LOG_ENV: &str = "DEVENGINES_LOG";

fn main() -> Result<()> {
    let cli = CLI::parse();
    init_logging(cli.verbose);
    execute::execute(cli)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,devengines=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
