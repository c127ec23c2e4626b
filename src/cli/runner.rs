//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ConnectorConfig;
use crate::engine::{ErrorResponse, SyncEngine, SyncRequest};
use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = ConnectorConfig::load(self.cli.config.as_deref())?;

        match &self.cli.command {
            Commands::Serve { port } => {
                let engine = Arc::new(SyncEngine::new(config)?);
                crate::cli::serve(engine, *port).await
            }
            Commands::Sync { request, pretty } => self.sync(config, request, *pretty).await,
            Commands::Config => {
                print!("{}", config.to_yaml()?);
                Ok(())
            }
        }
    }

    /// Run a single invocation and print the response (or error) as JSON
    async fn sync(&self, config: ConnectorConfig, request: &Path, pretty: bool) -> Result<()> {
        let body = read_request(request)?;
        let engine = SyncEngine::new(config)?;

        let result = match SyncRequest::from_slice(&body) {
            Ok(req) => engine.sync(&req).await,
            Err(e) => Err(e),
        };

        let (output, outcome) = match result {
            Ok(response) => (to_json(&response, pretty)?, Ok(())),
            Err(e) => (to_json(&ErrorResponse::from(&e), pretty)?, Err(e)),
        };
        println!("{output}");
        outcome
    }
}

/// Read the request body from a file, or stdin for `-`
fn read_request(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read(path)?)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(Error::Serialize)
}
