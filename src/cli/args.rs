//! CLI argument definitions using clap
//!
//! Commands:
//! - contented serve [--config <path>] [--port <port>]
//! - contented init --config <path>
//! - contented setup-index --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Contented - a schemaless document service with pluggable save hooks
#[derive(Parser, Debug)]
#[command(name = "contented")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file; built-in defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the data directory layout
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./contented.json")]
        config: PathBuf,
    },

    /// Create the search index if it does not exist, then exit
    SetupIndex {
        /// Path to configuration file
        #[arg(long, default_value = "./contented.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
