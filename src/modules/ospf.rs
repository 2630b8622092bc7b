//! OSPF instances, their networks, and per-interface network types.
//!
//! Each instance is one `router ospf <id>` block. Areas and redistribution
//! are re-scanned from that block. Which interfaces are active or passive
//! depends on `passive-interface default`: the configuration only lists the
//! exceptions, so the full set comes from `show ip ospf interface brief`.

use super::{attribute, capture, in_context, is_management, parse_number, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

static INSTANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(router ospf (\d+).*)$").expect("Invalid router ospf regex"));
static ROUTER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+router-id (\S+)$").expect("Invalid router-id regex"));
static MAX_LSA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+max-lsa (\d+)").expect("Invalid max-lsa regex"));
static MAXIMUM_PATHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+maximum-paths (\d+)").expect("Invalid maximum-paths regex")
});
static PASSIVE_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+passive-interface default$").expect("Invalid passive default regex")
});
static PASSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+passive-interface (\S+)$").expect("Invalid passive-interface regex")
});
static NOT_PASSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+no passive-interface (\S+)$").expect("Invalid passive-interface regex")
});
static NETWORK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+network (\S+) area (\S+)$").expect("Invalid network regex")
});
static REDISTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+redistribute (static|connected)(?: route-map (\S+))?$")
        .expect("Invalid redistribute regex")
});
static INTERFACE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^interface (.+)$").expect("Invalid interface regex"));

/// Command listing OSPF-enabled interfaces per instance.
pub const INTERFACE_BRIEF_COMMAND: &str = "show ip ospf interface brief";

/// Networks configured in one area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfArea {
    pub networks: Vec<String>,
}

/// One redistributed protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redistribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_map: Option<String>,
}

/// Observed state of one OSPF instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfInstance {
    pub instance_id: u32,
    pub router_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lsa: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_paths: Option<u32>,
    pub passive_interface_default: bool,
    pub active_interfaces: Vec<String>,
    pub passive_interfaces: Vec<String>,
    pub areas: BTreeMap<String, OspfArea>,
    pub redistribution: BTreeMap<String, Redistribution>,
}

impl OspfInstance {
    /// Interfaces listed explicitly in the configuration: active ones under
    /// `passive-interface default`, passive ones otherwise.
    pub fn interface_exceptions(&self) -> &[String] {
        if self.passive_interface_default {
            &self.active_interfaces
        } else {
            &self.passive_interfaces
        }
    }

    /// Every OSPF-enabled interface.
    pub fn all_interfaces(&self) -> BTreeSet<String> {
        self.active_interfaces
            .iter()
            .chain(&self.passive_interfaces)
            .cloned()
            .collect()
    }
}

/// OSPF link type of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    Broadcast,
    PointToPoint,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Broadcast => write!(f, "broadcast"),
            NetworkType::PointToPoint => write!(f, "point-to-point"),
        }
    }
}

/// OSPF settings of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfInterface {
    pub name: String,
    pub network_type: NetworkType,
}

/// One `network ... area ...` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfNetwork {
    pub network: String,
    pub area: String,
    pub instance_id: u32,
}

// ============================================================================
// Parsers
// ============================================================================

/// Every OSPF instance.
pub fn getall(node: &Node) -> Result<BTreeMap<u32, OspfInstance>> {
    let config = node.running_config()?;
    if !INSTANCE.is_match(config.as_str()) {
        return Ok(BTreeMap::new());
    }
    let enabled = parse_interface_brief(&node.show(INTERFACE_BRIEF_COMMAND)?)?;
    parse_instances(config.as_str(), &enabled)
}

/// Every non-management interface's OSPF settings.
pub fn interfaces(node: &Node) -> Result<BTreeMap<String, OspfInterface>> {
    Ok(parse_interfaces(node.running_config()?.as_str()))
}

/// Every network statement across all instances, keyed by network.
pub fn networks(node: &Node) -> Result<BTreeMap<String, OspfNetwork>> {
    Ok(networks_of(&getall(node)?))
}

/// Flattens instance areas into network statements.
pub fn networks_of(instances: &BTreeMap<u32, OspfInstance>) -> BTreeMap<String, OspfNetwork> {
    let mut networks = BTreeMap::new();
    for (id, instance) in instances {
        for (area, attrs) in &instance.areas {
            for network in &attrs.networks {
                networks.insert(
                    network.clone(),
                    OspfNetwork {
                        network: network.clone(),
                        area: area.clone(),
                        instance_id: *id,
                    },
                );
            }
        }
    }
    networks
}

/// Reads the OSPF-enabled interfaces of each default-VRF instance.
pub fn parse_interface_brief(reply: &Value) -> Result<BTreeMap<u32, Vec<String>>> {
    let mut enabled = BTreeMap::new();
    let Some(instances) = reply
        .pointer("/vrfs/default/instList")
        .and_then(Value::as_object)
    else {
        return Ok(enabled);
    };

    for (raw_id, attrs) in instances {
        let id: u32 = parse_number("ospf", "instance id", raw_id)?;
        let names = attrs
            .get("ospfInterfaces")
            .and_then(Value::as_object)
            .map(|ifaces| ifaces.keys().cloned().collect())
            .unwrap_or_default();
        enabled.insert(id, names);
    }
    Ok(enabled)
}

/// Parses every `router ospf` block.
pub fn parse_instances(
    config: &str,
    enabled: &BTreeMap<u32, Vec<String>>,
) -> Result<BTreeMap<u32, OspfInstance>> {
    let mut instances = BTreeMap::new();
    for caps in INSTANCE.captures_iter(config) {
        let id: u32 = parse_number("ospf", "instance id", &caps[2])?;
        let Some(block) = extract_block(config, &caps[1]) else {
            continue;
        };
        let all = enabled.get(&id).map(Vec::as_slice).unwrap_or_default();
        instances.insert(id, parse_instance(id, block, all)?);
    }
    Ok(instances)
}

/// Parses one instance block given its OSPF-enabled interfaces.
pub fn parse_instance(id: u32, block: &str, all_interfaces: &[String]) -> Result<OspfInstance> {
    let resource = format!("ospf {}", id);
    let max_lsa = capture(&MAX_LSA, block)
        .map(|raw| parse_number(&resource, "max-lsa", raw))
        .transpose()?;
    let maximum_paths = capture(&MAXIMUM_PATHS, block)
        .map(|raw| parse_number(&resource, "maximum-paths", raw))
        .transpose()?;

    let passive_interface_default = PASSIVE_DEFAULT.is_match(block);
    let explicit = |re: &Regex| -> BTreeSet<String> {
        re.captures_iter(block)
            .map(|caps| caps[1].to_string())
            .filter(|name| name != "default")
            .collect()
    };
    let subtract = |listed: &BTreeSet<String>| -> Vec<String> {
        all_interfaces
            .iter()
            .filter(|name| !listed.contains(*name))
            .cloned()
            .collect()
    };

    let (active_interfaces, passive_interfaces) = if passive_interface_default {
        let active = explicit(&NOT_PASSIVE);
        let passive = subtract(&active);
        (active.into_iter().collect(), passive)
    } else {
        let passive = explicit(&PASSIVE);
        let active = subtract(&passive);
        (active, passive.into_iter().collect())
    };

    let mut areas: BTreeMap<String, OspfArea> = BTreeMap::new();
    for caps in NETWORK.captures_iter(block) {
        areas
            .entry(caps[2].to_string())
            .or_default()
            .networks
            .push(caps[1].to_string());
    }

    let redistribution = REDISTRIBUTE
        .captures_iter(block)
        .map(|caps| {
            (
                caps[1].to_string(),
                Redistribution {
                    route_map: caps.get(2).map(|m| m.as_str().to_string()),
                },
            )
        })
        .collect();

    Ok(OspfInstance {
        instance_id: id,
        router_id: capture(&ROUTER_ID, block).unwrap_or_default().to_string(),
        max_lsa,
        maximum_paths,
        passive_interface_default,
        active_interfaces,
        passive_interfaces,
        areas,
        redistribution,
    })
}

/// Reads the OSPF network type of every non-management interface.
pub fn parse_interfaces(config: &str) -> BTreeMap<String, OspfInterface> {
    INTERFACE_NAME
        .captures_iter(config)
        .map(|caps| caps[1].to_string())
        .filter(|name| !is_management(name))
        .filter_map(|name| {
            let block = extract_block(config, &format!("interface {}", name))?;
            let network_type = if block.contains("ip ospf network point-to-point") {
                NetworkType::PointToPoint
            } else {
                NetworkType::Broadcast
            };
            Some((name.clone(), OspfInterface { name, network_type }))
        })
        .collect()
}

// ============================================================================
// Builders
// ============================================================================

fn context(id: u32) -> String {
    format!("router ospf {}", id)
}

pub fn create(id: u32) -> Vec<String> {
    vec![context(id)]
}

pub fn delete(id: u32) -> Vec<String> {
    vec![format!("no {}", context(id))]
}

pub fn default(id: u32) -> Vec<String> {
    vec![format!("default {}", context(id))]
}

pub fn set_router_id(id: u32, intent: &Intent<String>) -> Vec<String> {
    in_context(context(id), [attribute("router-id", intent)])
}

pub fn set_max_lsa(id: u32, intent: &Intent<u32>) -> Vec<String> {
    in_context(context(id), [attribute("max-lsa", intent)])
}

pub fn set_maximum_paths(id: u32, intent: &Intent<u32>) -> Vec<String> {
    in_context(context(id), [attribute("maximum-paths", intent)])
}

pub fn set_passive_interface_default(id: u32, intent: &Intent<bool>) -> Vec<String> {
    let line = match intent {
        Intent::Default => "default passive-interface default",
        Intent::Set(true) => "passive-interface default",
        Intent::Set(false) | Intent::Clear => "no passive-interface default",
    };
    in_context(context(id), [line.to_string()])
}

/// Replaces the interfaces that differ from the instance's default
/// passive setting. Every current exception is reset before the desired
/// exceptions are added.
pub fn set_interface_exceptions(
    id: u32,
    passive_default: bool,
    current: &[String],
    desired: &[String],
) -> Vec<String> {
    let exception = if passive_default {
        "no passive-interface"
    } else {
        "passive-interface"
    };
    let body = current
        .iter()
        .map(|name| format!("default passive-interface {}", name))
        .chain(desired.iter().map(|name| format!("{} {}", exception, name)));
    in_context(context(id), body)
}

pub fn add_redistribution(id: u32, protocol: &str, route_map: Option<&str>) -> Vec<String> {
    let line = match route_map {
        Some(map) => format!("redistribute {} route-map {}", protocol, map),
        None => format!("redistribute {}", protocol),
    };
    in_context(context(id), [line])
}

pub fn remove_redistribution(id: u32, protocol: &str) -> Vec<String> {
    in_context(context(id), [format!("no redistribute {}", protocol)])
}

fn network_line(network: &str, area: &str) -> String {
    format!("network {} area {}", network, area)
}

pub fn add_network(id: u32, network: &str, area: &str) -> Vec<String> {
    in_context(context(id), [network_line(network, area)])
}

pub fn remove_network(id: u32, network: &str, area: &str) -> Vec<String> {
    in_context(context(id), [format!("no {}", network_line(network, area))])
}

/// Moves a network to another area, or another instance.
pub fn move_network(current: &OspfNetwork, desired: &OspfNetwork) -> Vec<String> {
    if current.instance_id == desired.instance_id {
        in_context(
            context(current.instance_id),
            [
                format!("no {}", network_line(&current.network, &current.area)),
                network_line(&desired.network, &desired.area),
            ],
        )
    } else {
        let mut commands = remove_network(current.instance_id, &current.network, &current.area);
        commands.extend(add_network(desired.instance_id, &desired.network, &desired.area));
        commands
    }
}

/// Sets the interface's OSPF link type. Broadcast is the default and is
/// configured by removing the override.
pub fn set_network_type(name: &str, intent: &Intent<NetworkType>) -> Vec<String> {
    let intent = match intent {
        Intent::Set(NetworkType::Broadcast) => Intent::Clear,
        other => other.clone(),
    };
    in_context(
        format!("interface {}", name),
        [attribute("ip ospf network", &intent)],
    )
}

/// Checks an area identifier: a dotted quad or a 32-bit integer.
pub fn validate_area(area: &str) -> Result<()> {
    let dotted = area.split('.').count() == 4 && area.split('.').all(|o| o.parse::<u8>().is_ok());
    if dotted || area.parse::<u32>().is_ok() {
        Ok(())
    } else {
        Err(Error::validation(
            "ospf_network",
            format!("area '{}' is not a dotted quad or integer", area),
        ))
    }
}
