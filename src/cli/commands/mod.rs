//! Subcommands module for eosible CLI
//!
//! This module contains all the subcommand implementations.

pub mod apply;
pub mod check;
pub mod show;

use crate::cli::output::OutputFormatter;
use crate::cli::{Cli, OutputFormat};
use anyhow::Result;
use eosible::config::Config;
use eosible::eapi::EapiClient;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Output format
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: u8,
    /// Check mode (dry-run)
    pub check_mode: bool,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &Cli, mut config: Config) -> Self {
        if let Some(host) = &cli.host {
            config.connection.host = Some(host.clone());
        }

        Self {
            config,
            output: OutputFormatter::new(!cli.no_color, cli.output, cli.verbosity()),
            format: cli.output,
            verbosity: cli.verbosity(),
            check_mode: cli.check_mode,
        }
    }

    /// Build the eAPI client for the configured switch
    pub fn client(&self) -> Result<EapiClient> {
        let client = EapiClient::new(&self.config.connection)?;
        self.output.info(&format!("Connecting to {}", client.url()));
        Ok(client)
    }
}
