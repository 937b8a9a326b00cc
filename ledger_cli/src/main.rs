//! The "Concurrent Ledger CLI" app's entry point.

use clap::Parser;
use ledger_cli::args::Args;
use ledger_cli::constants::EXIT_IO_ERROR;
use ledger_cli::logic::{init_logging, run};
use log::error;
use std::process::ExitCode;

/// The "Concurrent Ledger CLI" app's entry point.
fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(EXIT_IO_ERROR)
        }
    }
}
