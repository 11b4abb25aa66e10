//! contented CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Configuration,
//! subsystem wiring and the async runtime all live in the CLI module.

use contented::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
