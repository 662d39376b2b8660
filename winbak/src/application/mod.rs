pub mod discover;
pub mod handlers;

use std::process::ExitCode;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winbak_core::error::Result;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            source,
            dest,
            encoding,
            prefix,
            no_host_concat,
            json,
        } => handlers::handle_extract(source, dest, encoding, prefix, no_host_concat, json),
        Commands::Resume {
            dest,
            no_host_concat,
            json,
        } => handlers::handle_resume(dest, no_host_concat, json),
        Commands::Plan {
            source,
            encoding,
            prefix,
        } => handlers::handle_plan(source, encoding, prefix),
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
