//! CLI module
//!
//! Command-line interface and HTTP server.
//!
//! # Commands
//!
//! - `serve` - Start the Fivetran function endpoint
//! - `sync` - Run a single invocation from a request file
//! - `config` - Print the effective configuration

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{router, serve};
