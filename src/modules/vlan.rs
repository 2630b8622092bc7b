//! VLANs, read from the structured `show vlan` replies.

use super::{attribute, in_context, parse_number, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Administrative VLAN state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VlanState {
    #[default]
    Active,
    Suspend,
}

impl VlanState {
    fn from_status(status: &str) -> Self {
        match status {
            "suspend" | "suspended" => VlanState::Suspend,
            _ => VlanState::Active,
        }
    }
}

impl fmt::Display for VlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlanState::Active => write!(f, "active"),
            VlanState::Suspend => write!(f, "suspend"),
        }
    }
}

/// Observed state of one VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub vlan_id: u16,
    pub name: String,
    pub state: VlanState,
    pub trunk_groups: Vec<String>,
}

/// Every VLAN on the device.
pub fn getall(node: &Node) -> Result<BTreeMap<u16, Vlan>> {
    let replies = node.enable(&["show vlan", "show vlan trunk group"])?;
    parse_vlans(&replies[0], &replies[1])
}

/// One VLAN, if configured.
pub fn get(node: &Node, vlan_id: u16) -> Result<Option<Vlan>> {
    Ok(getall(node)?.remove(&vlan_id))
}

/// Joins the `show vlan` and `show vlan trunk group` replies.
pub fn parse_vlans(vlans: &Value, trunk_groups: &Value) -> Result<BTreeMap<u16, Vlan>> {
    let entries = vlans
        .get("vlans")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::parse("show vlan", "missing 'vlans' object"))?;

    let mut result = BTreeMap::new();
    for (raw_id, attrs) in entries {
        let vlan_id: u16 = parse_number("vlan", "vlan id", raw_id)?;
        let groups = trunk_groups
            .pointer(&format!("/trunkGroups/{}/names", raw_id))
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        result.insert(
            vlan_id,
            Vlan {
                vlan_id,
                name: attrs
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                state: VlanState::from_status(
                    attrs.get("status").and_then(Value::as_str).unwrap_or_default(),
                ),
                trunk_groups: groups,
            },
        );
    }
    Ok(result)
}

// ============================================================================
// Builders
// ============================================================================

fn context(vlan_id: u16) -> String {
    format!("vlan {}", vlan_id)
}

pub fn create(vlan_id: u16) -> Vec<String> {
    vec![context(vlan_id)]
}

pub fn delete(vlan_id: u16) -> Vec<String> {
    vec![format!("no {}", context(vlan_id))]
}

pub fn default(vlan_id: u16) -> Vec<String> {
    vec![format!("default {}", context(vlan_id))]
}

pub fn set_name(vlan_id: u16, intent: &Intent<String>) -> Vec<String> {
    in_context(context(vlan_id), [attribute("name", intent)])
}

pub fn set_state(vlan_id: u16, intent: &Intent<VlanState>) -> Vec<String> {
    in_context(context(vlan_id), [attribute("state", intent)])
}

/// Replaces every trunk group on the VLAN.
pub fn set_trunk_groups(vlan_id: u16, intent: &Intent<Vec<String>>) -> Vec<String> {
    let body: Vec<String> = match intent {
        Intent::Default => vec!["default trunk group".to_string()],
        Intent::Clear => vec!["no trunk group".to_string()],
        Intent::Set(groups) => std::iter::once("no trunk group".to_string())
            .chain(groups.iter().map(|g| format!("trunk group {}", g)))
            .collect(),
    };
    in_context(context(vlan_id), body)
}
