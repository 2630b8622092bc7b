//! Check mode: reads reach the device, writes are only recorded.

use super::{Eapi, Format};
use crate::error::Result;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Configuration batches recorded by a [`DryRun`] transport.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    batches: Rc<RefCell<Vec<Vec<String>>>>,
}

impl Journal {
    /// Every recorded batch, in issue order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.borrow().clone()
    }

    /// Every recorded command, flattened.
    pub fn commands(&self) -> Vec<String> {
        self.batches.borrow().iter().flatten().cloned().collect()
    }

    fn record(&self, commands: &[String]) {
        self.batches.borrow_mut().push(commands.to_vec());
    }
}

/// Wraps a transport, forwarding show commands and acknowledging every
/// configuration command without sending it.
#[derive(Debug)]
pub struct DryRun<T> {
    inner: T,
    journal: Journal,
}

impl<T: Eapi> DryRun<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            journal: Journal::default(),
        }
    }

    /// A handle onto the recorded batches. It stays valid after the
    /// transport is moved into a [`Node`](super::Node).
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl<T: Eapi> Eapi for DryRun<T> {
    fn enable(&self, commands: &[String], format: Format) -> Result<Vec<Value>> {
        self.inner.enable(commands, format)
    }

    fn config(&self, commands: &[String]) -> Result<Vec<Value>> {
        debug!(?commands, "Recording configuration batch");
        self.journal.record(commands);
        Ok(commands.iter().map(|_| json!({})).collect())
    }
}
