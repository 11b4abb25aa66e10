//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Boot the service and run the HTTP API
//! - init: Create the data directory layout
//! - setup-index: Provision the search index

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_service, init, run, run_command, serve, setup_index, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
