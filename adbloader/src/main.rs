//! Bulk loader for data files into database tables.
//!
//! Reads CSV, TSV, JSON or spreadsheet files and appends them to an
//! existing table in ordered batches. Column types come from the
//! destination catalog; credentials come from the local RSA vault.

use adbloader::cli::Cli;
use adbloader::commands;
use adbloader_core::init_logging;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_format) {
        eprintln!("Error: {}", e);
        return ExitCode::from(e.exit_code());
    }

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!("Command failed: {:?}", error);
            eprintln!("Error: {}", error);
            for cause in error.chain().skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            ExitCode::from(commands::exit_code(&error))
        }
    }
}
