//! Resource families for Arista EOS.
//!
//! Each family module pairs a parser with a set of command builders:
//!
//! - parsers turn running-config text or structured eAPI replies into typed
//!   records keyed by resource identity. A block that is not configured
//!   yields no record; a malformed number fails the read.
//! - builders are pure functions from an identity and an [`Intent`] to the
//!   ordered configuration-mode commands that realize it. Every builder
//!   enters its configuration context first, unless the command is global.

pub mod interface;
pub mod ipinterface;
pub mod logging;
pub mod mlag;
pub mod ntp;
pub mod ospf;
pub mod prefixlist;
pub mod routemap;
pub mod staticroute;
pub mod stp;
pub mod switchport;
pub mod vlan;
pub mod vxlan;

use crate::eapi::Node;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Intent
// ============================================================================

/// What a builder should do with one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<T> {
    /// Reset to the device default (`default <attr>`)
    Default,
    /// Remove the attribute (`no <attr>`)
    Clear,
    /// Configure a value (`<attr> <value>`)
    Set(T),
}

impl<T> Intent<T> {
    /// Builds an intent from an optional value. `default` wins over any
    /// supplied value.
    pub fn from_value(value: Option<T>, default: bool) -> Self {
        match (default, value) {
            (true, _) => Intent::Default,
            (false, None) => Intent::Clear,
            (false, Some(v)) => Intent::Set(v),
        }
    }

    /// Maps the configured value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Intent<U> {
        match self {
            Intent::Default => Intent::Default,
            Intent::Clear => Intent::Clear,
            Intent::Set(v) => Intent::Set(f(v)),
        }
    }
}

impl Intent<String> {
    /// Like [`Intent::from_value`], but an empty string clears.
    pub fn from_text(value: Option<&str>, default: bool) -> Self {
        Intent::from_value(value.filter(|v| !v.is_empty()).map(str::to_string), default)
    }
}

/// Renders the three-way attribute line.
pub(crate) fn attribute<T: fmt::Display>(attr: &str, intent: &Intent<T>) -> String {
    match intent {
        Intent::Default => format!("default {}", attr),
        Intent::Clear => format!("no {}", attr),
        Intent::Set(value) => format!("{} {}", attr, value),
    }
}

/// Prefixes `body` with the command that enters `context`.
pub(crate) fn in_context(context: String, body: impl IntoIterator<Item = String>) -> Vec<String> {
    std::iter::once(context).chain(body).collect()
}

// ============================================================================
// Shared Types
// ============================================================================

/// Rule disposition shared by route-maps and prefix-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Permit,
    Deny,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Permit => write!(f, "permit"),
            Action::Deny => write!(f, "deny"),
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "permit" => Ok(Action::Permit),
            "deny" => Ok(Action::Deny),
            _ => Err(Error::validation(
                "action",
                format!("'{}' is not one of permit, deny", s),
            )),
        }
    }
}

// ============================================================================
// Parsing Helpers
// ============================================================================

/// First capture group of the first match.
pub(crate) fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First capture group of every match.
pub(crate) fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parses a numeric field scraped from device output.
pub(crate) fn parse_number<T: FromStr>(resource: &str, field: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        Error::validation(
            resource,
            format!("{} '{}' is not a valid number", field, raw),
        )
    })
}

/// Physical Ethernet ports.
pub(crate) fn is_ethernet(name: &str) -> bool {
    name.starts_with("Et")
}

/// Out-of-band management ports.
pub(crate) fn is_management(name: &str) -> bool {
    name.starts_with("Ma")
}

/// Names of interfaces forwarding as layer 2 ports, from `show interfaces`.
pub fn bridged_interfaces(node: &Node) -> Result<Vec<String>> {
    let reply = node.show("show interfaces")?;
    let interfaces = reply
        .get("interfaces")
        .and_then(|v| v.as_object())
        .ok_or_else(|| Error::parse("show interfaces", "missing 'interfaces' object"))?;

    Ok(interfaces
        .iter()
        .filter(|(_, attrs)| attrs.get("forwardingModel").and_then(|v| v.as_str()) == Some("bridged"))
        .map(|(name, _)| name.clone())
        .collect())
}
