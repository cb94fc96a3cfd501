use texport_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // File logging is best-effort; fall back to stderr in odd environments.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("texport error: {:#}", err);
        std::process::exit(1);
    }
}
