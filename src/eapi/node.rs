//! A managed EOS node.

use super::{acknowledged, text_output, Eapi, Format};
use crate::error::{Error, Result};
use crate::running_config::RunningConfig;
use serde_json::Value;
use std::cell::RefCell;
use tracing::{debug, info};

/// Command used to snapshot the running configuration, defaults included.
pub const RUNNING_CONFIG_COMMAND: &str = "show running-config all";

/// One managed node: a transport plus the running-config snapshot for the
/// current run.
///
/// The snapshot is fetched on first use and shared by every parser until a
/// configuration write succeeds, after which the next read fetches it again.
pub struct Node {
    api: Box<dyn Eapi>,
    running: RefCell<Option<RunningConfig>>,
}

impl Node {
    /// Wraps a transport.
    pub fn new(api: impl Eapi + 'static) -> Self {
        Self {
            api: Box::new(api),
            running: RefCell::new(None),
        }
    }

    /// Runs show commands with JSON replies.
    pub fn enable(&self, commands: &[&str]) -> Result<Vec<Value>> {
        let commands: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
        let replies = self.api.enable(&commands, Format::Json)?;
        if replies.len() != commands.len() {
            return Err(Error::parse(
                commands.join(", "),
                format!("expected {} replies, got {}", commands.len(), replies.len()),
            ));
        }
        Ok(replies)
    }

    /// Runs one show command and returns its reply.
    pub fn show(&self, command: &str) -> Result<Value> {
        self.enable(&[command])?
            .pop()
            .ok_or_else(|| Error::parse(command, "no reply"))
    }

    /// Runs one show command and returns its raw text.
    pub fn show_text(&self, command: &str) -> Result<String> {
        let replies = self.api.enable(&[command.to_string()], Format::Text)?;
        replies
            .last()
            .and_then(text_output)
            .map(str::to_string)
            .ok_or_else(|| Error::parse(command, "reply has no text output"))
    }

    /// The running configuration for this run.
    pub fn running_config(&self) -> Result<RunningConfig> {
        if let Some(config) = self.running.borrow().as_ref() {
            return Ok(config.clone());
        }

        let config = RunningConfig::new(self.show_text(RUNNING_CONFIG_COMMAND)?);
        debug!(config = ?config, "fetched running-config");
        *self.running.borrow_mut() = Some(config.clone());
        Ok(config)
    }

    /// Discards the cached running configuration.
    pub fn invalidate(&self) {
        self.running.borrow_mut().take();
    }

    /// Sends a configuration batch and checks that every command was
    /// acknowledged.
    pub fn apply(&self, commands: Vec<String>) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        info!(commands = ?commands, "applying configuration");
        let replies = self.api.config(&commands)?;
        self.invalidate();

        if acknowledged(&replies, commands.len()) {
            Ok(())
        } else {
            Err(Error::NotAcknowledged {
                replies: replies.len(),
                commands,
            })
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("running", &self.running.borrow())
            .finish_non_exhaustive()
    }
}
