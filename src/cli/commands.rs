//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OpenTable connector for Fivetran
#[derive(Parser, Debug)]
#[command(name = "fivetran-opentable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connector configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP endpoint Fivetran invokes
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,
    },

    /// Run one sync invocation and print the response
    Sync {
        /// Request body file (JSON), or `-` for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration
    Config,
}
