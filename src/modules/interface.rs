//! Interface attributes common to every interface type.

use super::{attribute, capture, in_context, is_ethernet, is_management, parse_number, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static INTERFACE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^interface (.+)$").expect("Invalid interface regex"));
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+description (.+)$").expect("Invalid description regex"));
static SPEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+speed (.+)$").expect("Invalid speed regex"));
static LACP_PRIORITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+lacp port-priority (\d+)$").expect("Invalid lacp port-priority regex")
});

/// Speed value meaning "not forced".
pub const DEFAULT_SPEED: &str = "default";

/// Observed state of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub description: String,
    pub shutdown: bool,
    /// Only reported for Ethernet ports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Only reported for Ethernet ports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lacp_priority: Option<u32>,
}

/// Every interface in the running configuration.
pub fn getall(node: &Node) -> Result<BTreeMap<String, Interface>> {
    parse_interfaces(node.running_config()?.as_str())
}

/// One interface, if configured.
pub fn get(node: &Node, name: &str) -> Result<Option<Interface>> {
    parse_interface(node.running_config()?.as_str(), name)
}

/// Parses every `interface` block.
pub fn parse_interfaces(config: &str) -> Result<BTreeMap<String, Interface>> {
    let mut interfaces = BTreeMap::new();
    for caps in INTERFACE_NAME.captures_iter(config) {
        let name = &caps[1];
        if let Some(interface) = parse_interface(config, name)? {
            interfaces.insert(interface.name.clone(), interface);
        }
    }
    Ok(interfaces)
}

/// Parses the block for `name`.
pub fn parse_interface(config: &str, name: &str) -> Result<Option<Interface>> {
    let Some(block) = extract_block(config, &format!("interface {}", name)) else {
        return Ok(None);
    };

    let (speed, lacp_priority) = if is_ethernet(name) {
        let speed = capture(&SPEED, block).unwrap_or(DEFAULT_SPEED).to_string();
        let lacp_priority = capture(&LACP_PRIORITY, block)
            .map(|raw| parse_number(name, "lacp port-priority", raw))
            .transpose()?;
        (Some(speed), lacp_priority)
    } else {
        (None, None)
    };

    Ok(Some(Interface {
        name: name.to_string(),
        description: capture(&DESCRIPTION, block).unwrap_or_default().to_string(),
        shutdown: !block.contains("no shutdown"),
        speed,
        lacp_priority,
    }))
}

// ============================================================================
// Builders
// ============================================================================

fn context(name: &str) -> String {
    format!("interface {}", name)
}

fn physical(name: &str) -> bool {
    is_ethernet(name) || is_management(name)
}

/// Creates a logical interface. Physical ports always exist.
pub fn create(name: &str) -> Result<Vec<String>> {
    if physical(name) {
        return Err(Error::validation(
            name,
            "physical interfaces cannot be created",
        ));
    }
    Ok(vec![context(name)])
}

/// Removes a logical interface. Physical ports cannot be removed.
pub fn delete(name: &str) -> Result<Vec<String>> {
    if physical(name) {
        return Err(Error::validation(
            name,
            "physical interfaces cannot be removed",
        ));
    }
    Ok(vec![format!("no {}", context(name))])
}

/// Resets the whole interface to its defaults.
pub fn default(name: &str) -> Vec<String> {
    vec![format!("default {}", context(name))]
}

pub fn set_description(name: &str, intent: &Intent<String>) -> Vec<String> {
    in_context(context(name), [attribute("description", intent)])
}

pub fn set_shutdown(name: &str, intent: &Intent<bool>) -> Vec<String> {
    let line = match intent {
        Intent::Default => "default shutdown",
        Intent::Set(true) => "shutdown",
        Intent::Set(false) | Intent::Clear => "no shutdown",
    };
    in_context(context(name), [line.to_string()])
}

/// Forces the port speed. A value of `default` resets it.
pub fn set_speed(name: &str, intent: &Intent<String>) -> Vec<String> {
    let intent = match intent {
        Intent::Set(speed) if speed == DEFAULT_SPEED => Intent::Clear,
        other => other.clone(),
    };
    in_context(context(name), [attribute("speed", &intent)])
}

pub fn set_lacp_priority(name: &str, intent: &Intent<u32>) -> Vec<String> {
    in_context(context(name), [attribute("lacp port-priority", intent)])
}
