//! CLI module for eosible
//!
//! This module provides the command-line interface using clap.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// eosible - declarative configuration for Arista EOS
#[derive(Parser, Debug, Clone)]
#[command(name = "eosible")]
#[command(author = "eosible Contributors")]
#[command(version)]
#[command(about = "Declarative configuration management for Arista EOS", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Switch to manage (overrides the configured host)
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Record configuration commands instead of sending them
    #[arg(long = "check", global = true)]
    pub check_mode: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "EOSIBLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the current state of one resource family
    Show(commands::show::ShowArgs),

    /// Converge the switch to a manifest
    Apply(commands::apply::ApplyArgs),

    /// Report what a manifest would change without changing it
    Check(commands::check::CheckArgs),
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if output should be machine-readable
    pub fn is_structured(&self) -> bool {
        matches!(self.output, OutputFormat::Json | OutputFormat::Yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_with_globals() {
        let cli = Cli::try_parse_from([
            "eosible", "-vv", "--output", "json", "apply", "site.yml", "--host", "veos01",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 2);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.host.as_deref(), Some("veos01"));
        assert!(cli.is_structured());
        match cli.command {
            Commands::Apply(args) => assert_eq!(args.manifest, PathBuf::from("site.yml")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_is_capped() {
        let cli = Cli::try_parse_from(["eosible", "-vvvvv", "show", "vlans"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_unknown_family_rejected() {
        assert!(Cli::try_parse_from(["eosible", "show", "bgp"]).is_err());
    }
}
