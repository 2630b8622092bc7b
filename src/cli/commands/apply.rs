//! Apply command - converge a switch to a manifest

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use eosible::eapi::{DryRun, Node};
use eosible::reconcile::{self, Manifest, Report};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Exit code for a run in which at least one resource failed.
pub const EXIT_RESOURCE_FAILED: i32 = 2;

/// Arguments for the apply command
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub manifest: PathBuf,
}

/// Structured form of a run, for JSON and YAML output.
#[derive(Serialize)]
struct Summary<'a> {
    check_mode: bool,
    ok: usize,
    changed: usize,
    failed: usize,
    outcomes: &'a [reconcile::Outcome],
    #[serde(skip_serializing_if = "Option::is_none")]
    commands: Option<Vec<String>>,
}

impl ApplyArgs {
    /// Execute the apply command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let manifest = Manifest::load(&self.manifest)?;

        ctx.output.banner(if ctx.check_mode {
            "EOSIBLE CHECK"
        } else {
            "EOSIBLE APPLY"
        });
        ctx.output.info(&format!(
            "Manifest: {} ({} resources)",
            self.manifest.display(),
            manifest.resources.len()
        ));

        let client = ctx.client()?;
        let (report, commands) = if ctx.check_mode {
            let transport = DryRun::new(client);
            let journal = transport.journal();
            let report = reconcile::apply(&Node::new(transport), &manifest)?;
            (report, Some(journal.commands()))
        } else {
            (reconcile::apply(&Node::new(client), &manifest)?, None)
        };

        info!(
            ok = report.ok(),
            changed = report.changed(),
            failed = report.failed(),
            "Run complete"
        );
        self.print(ctx, &report, commands)?;

        Ok(if report.has_failures() {
            EXIT_RESOURCE_FAILED
        } else {
            0
        })
    }

    fn print(&self, ctx: &CommandContext, report: &Report, commands: Option<Vec<String>>) -> Result<()> {
        if ctx.format != crate::cli::OutputFormat::Human {
            return ctx.output.document(&Summary {
                check_mode: ctx.check_mode,
                ok: report.ok(),
                changed: report.changed(),
                failed: report.failed(),
                outcomes: &report.outcomes,
                commands,
            });
        }

        for outcome in &report.outcomes {
            ctx.output.outcome(outcome);
        }
        if let Some(commands) = commands {
            ctx.output.commands(&commands);
        }
        ctx.output.recap(report);
        Ok(())
    }
}
