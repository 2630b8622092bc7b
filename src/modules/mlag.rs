//! MLAG membership of port-channel interfaces.

use super::{attribute, in_context, parse_number, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One interface bound to an MLAG id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlagInterface {
    pub name: String,
    pub mlag_id: u32,
}

/// Every MLAG interface, keyed by local interface name.
pub fn getall(node: &Node) -> Result<BTreeMap<String, MlagInterface>> {
    parse_mlag_interfaces(&node.show("show mlag interfaces")?)
}

pub fn get(node: &Node, name: &str) -> Result<Option<MlagInterface>> {
    Ok(getall(node)?.remove(name))
}

/// Parses the structured `show mlag interfaces` reply.
pub fn parse_mlag_interfaces(reply: &Value) -> Result<BTreeMap<String, MlagInterface>> {
    let Some(entries) = reply.get("interfaces").and_then(Value::as_object) else {
        return Ok(BTreeMap::new());
    };

    let mut interfaces = BTreeMap::new();
    for (id, attrs) in entries {
        let name = attrs
            .get("localInterface")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::parse(
                    "show mlag interfaces",
                    format!("mlag {} has no localInterface", id),
                )
            })?;
        let mlag_id = parse_number(name, "mlag id", id)?;
        interfaces.insert(
            name.to_string(),
            MlagInterface {
                name: name.to_string(),
                mlag_id,
            },
        );
    }
    Ok(interfaces)
}

// ============================================================================
// Builders
// ============================================================================

pub fn set_mlag_id(name: &str, intent: &Intent<u32>) -> Vec<String> {
    in_context(format!("interface {}", name), [attribute("mlag", intent)])
}
