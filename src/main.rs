//! eosible - declarative configuration for Arista EOS
//!
//! This is the main entry point for the eosible CLI.

mod cli;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use eosible::config::Config;
use eosible::error::Error;
use eosible::telemetry::{LogLevel, LoggingBuilder};

/// Exit code when the configuration cannot be loaded.
const EXIT_CONFIG: i32 = 6;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Initialize logging; -v flags override the configured level
    init_logging(&cli, &config);

    if cli.verbosity() >= 2 {
        eprintln!("eosible v{}", eosible::VERSION);
    }

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    let exit_code = match run(&cli, &mut ctx) {
        Ok(code) => code,
        Err(err) => {
            ctx.output.error(&format!("{:#}", err));
            err.downcast_ref::<Error>().map_or(1, Error::exit_code)
        }
    };

    std::process::exit(exit_code);
}

/// Execute the appropriate command
fn run(cli: &Cli, ctx: &mut CommandContext) -> Result<i32> {
    match &cli.command {
        Commands::Show(args) => args.execute(ctx),
        Commands::Apply(args) => args.execute(ctx),
        Commands::Check(args) => args.execute(ctx),
    }
}

/// Initialize logging from the `[logging]` section and CLI verbosity
fn init_logging(cli: &Cli, config: &Config) {
    let mut builder = LoggingBuilder::from_config(config.logging.clone());
    if cli.verbose > 0 {
        builder = builder
            .with_level(LogLevel::from_verbosity(cli.verbosity()))
            .with_target(cli.verbosity() >= 3);
    }
    if cli.no_color {
        builder = builder.with_ansi(false);
    }

    if let Err(e) = builder.init() {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
}
