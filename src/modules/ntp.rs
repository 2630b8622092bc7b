//! Global NTP settings.

use super::{attribute, capture, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SOURCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^ntp source (\S+)$").expect("Invalid ntp source regex"));
static SOURCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[EMPLV]").expect("Invalid ntp source name regex"));

/// Singleton name of the NTP settings.
pub const NTP_SETTINGS: &str = "settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtpConfig {
    pub name: String,
    /// Empty when unset
    pub source_interface: String,
}

pub fn get(node: &Node) -> Result<NtpConfig> {
    Ok(parse_ntp(node.running_config()?.as_str()))
}

pub fn parse_ntp(config: &str) -> NtpConfig {
    NtpConfig {
        name: NTP_SETTINGS.to_string(),
        source_interface: capture(&SOURCE, config).unwrap_or_default().to_string(),
    }
}

/// Checks that `name` looks like an Ethernet, Management, Port-Channel,
/// Loopback or Vlan interface.
pub fn validate_source_interface(name: &str) -> Result<()> {
    if name.is_empty() || SOURCE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(Error::validation(
            "ntp source",
            format!("'{}' is not a valid source interface", name),
        ))
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn set_source_interface(intent: &Intent<String>) -> Vec<String> {
    vec![attribute("ntp source", intent)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ntp() {
        let config = "ntp source Loopback0\nntp server 10.0.0.1\n";
        assert_eq!(parse_ntp(config).source_interface, "Loopback0");
        assert_eq!(parse_ntp("").source_interface, "");
    }

    #[test]
    fn test_validate_source_interface() {
        assert!(validate_source_interface("Loopback0").is_ok());
        assert!(validate_source_interface("Management1").is_ok());
        assert!(validate_source_interface("foo").is_err());
    }

    #[test]
    fn test_builders() {
        assert_eq!(
            set_source_interface(&Intent::Set("Vlan10".into())),
            vec!["ntp source Vlan10"]
        );
        assert_eq!(set_source_interface(&Intent::Clear), vec!["no ntp source"]);
        assert_eq!(set_source_interface(&Intent::Default), vec!["default ntp source"]);
    }
}
