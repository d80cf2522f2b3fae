//! Main entry point for the sunzip CLI application.
//!
//! Reads a ZIP archive from standard input and extracts it into the
//! directory given on the command line.

use std::process::ExitCode;

use clap::Parser;

use sunzip::{Cli, Config, DiskSink, Fatal, Reporter, unzip};

/// Application entry point.
///
/// Exits with 0 once every entry has been attempted, even if some were
/// skipped with a warning, and with 1 on any fatal error.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut reporter = Reporter::stdio();
    match run(&cli, &mut reporter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => {
            reporter.fatal(&fatal);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: &Cli,
    reporter: &mut Reporter<std::io::Stdout, std::io::Stderr>,
) -> Result<(), Fatal> {
    let config = Config::resolve(cli)?;
    unzip(&config, &mut tokio::io::stdin(), &DiskSink, reporter).await
}
