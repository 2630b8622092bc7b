//! Output formatting module for eosible
//!
//! Human output is colored unless `--no-color` or `NO_COLOR` is set;
//! structured output goes to stdout as a single JSON or YAML document.

use super::OutputFormat;
use anyhow::Result;
use colored::Colorize;
use eosible::reconcile::{Outcome, Report, Status};
use serde::Serialize;

/// Colored label for a resource status.
fn colored_status(status: Status) -> String {
    match status {
        Status::Ok => "ok".green().to_string(),
        Status::Changed => "changed".yellow().to_string(),
        Status::Failed => "failed".red().bold().to_string(),
    }
}

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Output format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        colored::control::set_override(use_color);

        Self {
            use_color,
            format,
            verbosity,
        }
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        if !self.is_human() {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if !self.is_human() {
            return;
        }

        println!("\n{}", title.cyan().bold());
        println!("{}", "-".repeat(title.len()).cyan());
    }

    /// Print an informational line (shown with -v)
    pub fn info(&self, message: &str) {
        if self.is_human() && self.verbosity >= 1 {
            println!("{}", message.dimmed());
        }
    }

    /// Print a warning to stderr
    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", "[WARNING]".yellow().bold(), message);
    }

    /// Print an error to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "[ERROR]".red().bold(), message);
    }

    /// Print one resource outcome
    pub fn outcome(&self, outcome: &Outcome) {
        if !self.is_human() {
            return;
        }

        let label = format!("{}[{}]", outcome.resource_type, outcome.name);
        let mut line = format!("{}: {}", colored_status(outcome.status), label);
        if !outcome.changed.is_empty() {
            line.push_str(&format!(" => {}", outcome.changed.join(", ")));
        }
        println!("{}", line);

        if let Some(error) = &outcome.error {
            println!("    {}", error.red());
        }
    }

    /// Print the run recap
    pub fn recap(&self, report: &Report) {
        if !self.is_human() {
            return;
        }

        self.section("RECAP");
        println!(
            "{}={}  {}={}  {}={}",
            "ok".green(),
            report.ok(),
            "changed".yellow(),
            report.changed(),
            "failed".red(),
            report.failed()
        );
    }

    /// Print the commands recorded in check mode
    pub fn commands(&self, commands: &[String]) {
        if !self.is_human() {
            return;
        }

        self.section("COMMANDS");
        if commands.is_empty() {
            println!("{}", "(none)".dimmed());
        }
        for command in commands {
            println!("{}", command);
        }
    }

    /// Print a serializable document in the selected format. Human output
    /// uses YAML.
    pub fn document<T: Serialize>(&self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml | OutputFormat::Human => print!("{}", serde_yaml::to_string(value)?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colored_status_carries_label() {
        colored::control::set_override(false);
        assert_eq!(colored_status(Status::Ok), "ok");
        assert_eq!(colored_status(Status::Changed), "changed");
        assert_eq!(colored_status(Status::Failed), "failed");
    }

    #[test]
    fn test_structured_output_is_not_human() {
        let formatter = OutputFormatter::new(false, OutputFormat::Json, 0);
        assert!(!formatter.is_human());
        let formatter = OutputFormatter::new(false, OutputFormat::Human, 0);
        assert!(formatter.is_human());
    }
}
