//! Spanning tree: the global mode, MST instance priorities, and per-port
//! portfast.

use super::{attribute, bridged_interfaces, capture, in_context, parse_number, Intent};
use crate::eapi::Node;
use crate::error::Result;
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static MODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^spanning-tree mode (\S+)$").expect("Invalid spanning-tree mode regex")
});
static MST_PRIORITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^spanning-tree mst (\d+) priority (\d+)$")
        .expect("Invalid spanning-tree mst regex")
});
static PORTFAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+spanning-tree portfast$").expect("Invalid spanning-tree portfast regex")
});

/// Command returning just the spanning-tree mode line.
pub const MODE_COMMAND: &str = "show running-config section spanning-tree mode";

/// Priority of one MST instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MstInstance {
    pub instance_id: u16,
    pub priority: u32,
}

/// Spanning-tree settings of one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StpInterface {
    pub name: String,
    pub portfast: bool,
}

/// The configured spanning-tree mode, if any.
pub fn get_mode(node: &Node) -> Result<Option<String>> {
    Ok(parse_mode(&node.show_text(MODE_COMMAND)?))
}

pub fn parse_mode(text: &str) -> Option<String> {
    capture(&MODE, text).map(str::to_string)
}

/// Every MST instance with an explicit priority.
pub fn mst_instances(node: &Node) -> Result<BTreeMap<u16, MstInstance>> {
    parse_mst_instances(node.running_config()?.as_str())
}

pub fn parse_mst_instances(config: &str) -> Result<BTreeMap<u16, MstInstance>> {
    let mut instances = BTreeMap::new();
    for caps in MST_PRIORITY.captures_iter(config) {
        let instance_id = parse_number("mst_instance", "instance", &caps[1])?;
        let priority = parse_number("mst_instance", "priority", &caps[2])?;
        instances.insert(
            instance_id,
            MstInstance {
                instance_id,
                priority,
            },
        );
    }
    Ok(instances)
}

/// Portfast state of every bridged port.
pub fn interfaces(node: &Node) -> Result<BTreeMap<String, StpInterface>> {
    let names = bridged_interfaces(node)?;
    let config = node.running_config()?;
    Ok(parse_interfaces(config.as_str(), &names))
}

pub fn parse_interfaces(config: &str, names: &[String]) -> BTreeMap<String, StpInterface> {
    names
        .iter()
        .filter_map(|name| {
            let block = extract_block(config, &format!("interface {}", name))?;
            Some((
                name.clone(),
                StpInterface {
                    name: name.clone(),
                    portfast: PORTFAST.is_match(block),
                },
            ))
        })
        .collect()
}

// ============================================================================
// Builders
// ============================================================================

pub fn set_mode(intent: &Intent<String>) -> Vec<String> {
    vec![attribute("spanning-tree mode", intent)]
}

pub fn set_mst_priority(instance_id: u16, intent: &Intent<u32>) -> Vec<String> {
    vec![attribute(
        &format!("spanning-tree mst {} priority", instance_id),
        intent,
    )]
}

/// Removes the instance from the MST region.
pub fn delete_mst_instance(instance_id: u16) -> Vec<String> {
    in_context(
        "spanning-tree mst configuration".to_string(),
        [format!("no instance {}", instance_id), "exit".to_string()],
    )
}

pub fn set_portfast(name: &str, intent: &Intent<bool>) -> Vec<String> {
    let line = match intent {
        Intent::Default => "default spanning-tree portfast",
        Intent::Set(true) => "spanning-tree portfast",
        Intent::Set(false) | Intent::Clear => "no spanning-tree portfast",
    };
    in_context(format!("interface {}", name), [line.to_string()])
}
