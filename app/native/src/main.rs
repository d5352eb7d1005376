//! aiwall command-line entry point.
//!
//! Exit codes: 0 on success (and when another instance already holds the
//! lock), 1 on any other failure.

use aiwall_lib::cli::Cli;
use aiwall_lib::cli::output::print_error;
use aiwall_lib::error::AiwallError;
use aiwall_lib::logging;
use aiwall_lib::paths::{default_work_dir, purge_work_dir};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = cli.execute();
    purge_work_dir(&default_work_dir());

    match result {
        Ok(()) => {}
        Err(AiwallError::AlreadyRunning) => {
            tracing::warn!("{}", AiwallError::AlreadyRunning);
        }
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}
