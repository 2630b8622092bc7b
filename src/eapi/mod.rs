//! Arista eAPI transport.
//!
//! Every read and write in eosible goes through the [`Eapi`] trait: `enable`
//! runs show commands and returns one reply per command, `config` runs
//! configuration commands and returns one acknowledgement per command. The
//! HTTP implementation lives in [`client`]; [`Node`] layers the running-config
//! snapshot cache and acknowledgement checking on top of any implementation,
//! and [`DryRun`] records configuration batches instead of sending them.

pub mod client;
pub mod dry_run;
pub mod node;

pub use client::EapiClient;
pub use dry_run::{DryRun, Journal};
pub use node::Node;

use crate::error::Result;
use serde_json::Value;
use std::fmt;

/// Reply encoding requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Structured JSON replies
    #[default]
    Json,
    /// Raw CLI text under the `output` key
    Text,
}

impl Format {
    /// Wire name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command execution against one EOS node.
pub trait Eapi {
    /// Runs privileged-mode commands, one reply per command.
    fn enable(&self, commands: &[String], format: Format) -> Result<Vec<Value>>;

    /// Runs configuration-mode commands, one acknowledgement per command.
    fn config(&self, commands: &[String]) -> Result<Vec<Value>>;
}

impl<T: Eapi + ?Sized> Eapi for Box<T> {
    fn enable(&self, commands: &[String], format: Format) -> Result<Vec<Value>> {
        (**self).enable(commands, format)
    }

    fn config(&self, commands: &[String]) -> Result<Vec<Value>> {
        (**self).config(commands)
    }
}

/// Returns true if `replies` holds exactly one empty object per issued
/// command.
pub fn acknowledged(replies: &[Value], issued: usize) -> bool {
    replies.len() == issued
        && replies
            .iter()
            .all(|reply| reply.as_object().map_or(false, |obj| obj.is_empty()))
}

/// Returns the raw text of a text-format reply.
pub fn text_output(reply: &Value) -> Option<&str> {
    reply.get("output").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_acknowledged_requires_one_marker_per_command() {
        assert!(acknowledged(&[json!({}), json!({})], 2));
        assert!(!acknowledged(&[json!({})], 2));
        assert!(!acknowledged(&[json!({}), json!({}), json!({})], 2));
    }

    #[test]
    fn test_acknowledged_rejects_non_empty_markers() {
        assert!(!acknowledged(&[json!({}), json!({"errors": ["bad"]})], 2));
        assert!(!acknowledged(&[json!({}), json!(null)], 2));
    }

    #[test]
    fn test_text_output() {
        let reply = json!({"output": "hostname veos\n"});
        assert_eq!(text_output(&reply), Some("hostname veos\n"));
        assert_eq!(text_output(&json!({})), None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(Format::Json.as_str(), "json");
        assert_eq!(Format::Text.to_string(), "text");
    }
}
