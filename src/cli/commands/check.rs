//! Check command - dry-run mode
//!
//! Reads still reach the switch; configuration batches are recorded and
//! printed instead of sent.

use super::CommandContext;
use crate::cli::commands::apply::ApplyArgs;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub manifest: PathBuf,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        // Force check mode
        ctx.check_mode = true;

        let apply_args = ApplyArgs {
            manifest: self.manifest.clone(),
        };
        apply_args.execute(ctx)
    }
}
