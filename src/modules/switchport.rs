//! Layer 2 switchport settings.
//!
//! The operating mode is read from `show interfaces <name> switchport`
//! because an access port's mode is implicit in its configuration. Trunk
//! lists come from the interface's configuration block.

use super::{attribute, bridged_interfaces, capture, capture_all, in_context, parse_number, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

static OPERATIONAL_MODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Operational Mode:\s([[:alnum:] ]+)\n").expect("Invalid operational mode regex")
});
static NATIVE_VLAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Trunking Native Mode VLAN:\s(\d+)").expect("Invalid native vlan regex")
});
static ACCESS_VLAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Access Mode VLAN:\s(\d+)").expect("Invalid access vlan regex"));
static TRUNK_ALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+switchport trunk allowed vlan (.+)$")
        .expect("Invalid trunk allowed vlan regex")
});
static TRUNK_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+switchport trunk group (\S+)$").expect("Invalid trunk group regex")
});

/// VLAN assumed when the operational output names none.
pub const DEFAULT_VLAN: u16 = 1;

/// Switchport operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SwitchportMode {
    Access,
    #[default]
    Trunk,
}

impl SwitchportMode {
    /// Maps the `Operational Mode:` text. Anything but static access is a
    /// trunk.
    pub fn from_operational(text: &str) -> Self {
        if text.trim() == "static access" {
            SwitchportMode::Access
        } else {
            SwitchportMode::Trunk
        }
    }
}

impl fmt::Display for SwitchportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchportMode::Access => write!(f, "access"),
            SwitchportMode::Trunk => write!(f, "trunk"),
        }
    }
}

impl FromStr for SwitchportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "access" => Ok(SwitchportMode::Access),
            "trunk" => Ok(SwitchportMode::Trunk),
            _ => Err(Error::validation(
                "switchport",
                format!("mode '{}' is not one of access, trunk", s),
            )),
        }
    }
}

/// Observed state of one switchport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switchport {
    pub name: String,
    pub mode: SwitchportMode,
    pub trunk_allowed_vlans: Vec<String>,
    pub trunk_native_vlan: u16,
    pub access_vlan: u16,
    pub trunk_groups: Vec<String>,
}

/// Every bridged interface.
pub fn getall(node: &Node) -> Result<BTreeMap<String, Switchport>> {
    let mut switchports = BTreeMap::new();
    for name in bridged_interfaces(node)? {
        if let Some(switchport) = get(node, &name)? {
            switchports.insert(name, switchport);
        }
    }
    Ok(switchports)
}

/// One switchport, if the interface has a configuration block.
pub fn get(node: &Node, name: &str) -> Result<Option<Switchport>> {
    let operational = node.show_text(&format!("show interfaces {} switchport", name))?;
    let config = node.running_config()?;
    parse_switchport(name, &operational, config.as_str())
}

/// Combines the operational text and the configuration block for `name`.
pub fn parse_switchport(name: &str, operational: &str, config: &str) -> Result<Option<Switchport>> {
    let Some(block) = extract_block(config, &format!("interface {}", name)) else {
        return Ok(None);
    };

    let mode = capture(&OPERATIONAL_MODE, operational)
        .map(SwitchportMode::from_operational)
        .unwrap_or_default();

    let trunk_native_vlan = capture(&NATIVE_VLAN, operational)
        .map(|raw| parse_number(name, "trunk native vlan", raw))
        .transpose()?
        .unwrap_or(DEFAULT_VLAN);

    let access_vlan = capture(&ACCESS_VLAN, operational)
        .map(|raw| parse_number(name, "access vlan", raw))
        .transpose()?
        .unwrap_or(DEFAULT_VLAN);

    let trunk_allowed_vlans = match capture(&TRUNK_ALLOWED, block).map(str::trim) {
        None | Some("none") => Vec::new(),
        Some(vlans) => vlans.split(',').map(|v| v.trim().to_string()).collect(),
    };

    Ok(Some(Switchport {
        name: name.to_string(),
        mode,
        trunk_allowed_vlans,
        trunk_native_vlan,
        access_vlan,
        trunk_groups: capture_all(&TRUNK_GROUP, block),
    }))
}

// ============================================================================
// Builders
// ============================================================================

fn context(name: &str) -> String {
    format!("interface {}", name)
}

/// Turns a routed port into a switchport.
pub fn create(name: &str) -> Vec<String> {
    in_context(
        context(name),
        ["no ip address".to_string(), "switchport".to_string()],
    )
}

/// Turns the switchport back into a routed port.
pub fn delete(name: &str) -> Vec<String> {
    in_context(context(name), ["no switchport".to_string()])
}

pub fn default(name: &str) -> Vec<String> {
    in_context(context(name), ["default switchport".to_string()])
}

pub fn set_mode(name: &str, intent: &Intent<SwitchportMode>) -> Vec<String> {
    in_context(context(name), [attribute("switchport mode", intent)])
}

/// Restates the full allowed list in one line. An empty list allows none.
pub fn set_trunk_allowed_vlans(name: &str, intent: &Intent<Vec<String>>) -> Vec<String> {
    let intent = intent.clone().map(|vlans| {
        if vlans.is_empty() {
            "none".to_string()
        } else {
            vlans.join(",")
        }
    });
    in_context(context(name), [attribute("switchport trunk allowed vlan", &intent)])
}

pub fn set_trunk_native_vlan(name: &str, intent: &Intent<u16>) -> Vec<String> {
    in_context(context(name), [attribute("switchport trunk native vlan", intent)])
}

pub fn set_access_vlan(name: &str, intent: &Intent<u16>) -> Vec<String> {
    in_context(context(name), [attribute("switchport access vlan", intent)])
}

/// Replaces every trunk group on the port.
pub fn set_trunk_groups(name: &str, intent: &Intent<Vec<String>>) -> Vec<String> {
    let body: Vec<String> = match intent {
        Intent::Default => vec!["default switchport trunk group".to_string()],
        Intent::Clear => vec!["no switchport trunk group".to_string()],
        Intent::Set(groups) => std::iter::once("no switchport trunk group".to_string())
            .chain(groups.iter().map(|g| format!("switchport trunk group {}", g)))
            .collect(),
    };
    in_context(context(name), body)
}
