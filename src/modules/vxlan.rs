//! The VXLAN tunnel interface. EOS supports a single one, `Vxlan1`.

use super::{attribute, capture, in_context, parse_number, Intent};
use crate::eapi::Node;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static SOURCE_INTERFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+vxlan source-interface (\S+)$").expect("Invalid source-interface regex")
});
static MULTICAST_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+vxlan multicast-group (\S+)$").expect("Invalid multicast-group regex")
});
static UDP_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+vxlan udp-port (\d+)$").expect("Invalid udp-port regex"));
static VLAN_VNI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+vxlan vlan (\d+) vni (\d+)$").expect("Invalid vlan vni regex")
});

/// Name of the VXLAN interface.
pub const VXLAN_INTERFACE: &str = "Vxlan1";

/// Observed state of the VXLAN interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vxlan {
    pub name: String,
    pub source_interface: String,
    pub multicast_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_port: Option<u16>,
    /// VNI bound to each VLAN
    pub vlans: BTreeMap<u16, u32>,
}

/// The VXLAN interface, if configured.
pub fn get(node: &Node) -> Result<Option<Vxlan>> {
    let text = node.show_text(&format!(
        "show running-config all interfaces {}",
        VXLAN_INTERFACE
    ))?;
    parse_vxlan(&text)
}

/// Parses `show running-config all interfaces Vxlan1`. Empty output means
/// the interface does not exist.
pub fn parse_vxlan(text: &str) -> Result<Option<Vxlan>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let mut vlans = BTreeMap::new();
    for caps in VLAN_VNI.captures_iter(text) {
        vlans.insert(
            parse_number(VXLAN_INTERFACE, "vlan", &caps[1])?,
            parse_number(VXLAN_INTERFACE, "vni", &caps[2])?,
        );
    }

    Ok(Some(Vxlan {
        name: VXLAN_INTERFACE.to_string(),
        source_interface: capture(&SOURCE_INTERFACE, text).unwrap_or_default().to_string(),
        multicast_group: capture(&MULTICAST_GROUP, text).unwrap_or_default().to_string(),
        udp_port: capture(&UDP_PORT, text)
            .map(|raw| parse_number(VXLAN_INTERFACE, "udp-port", raw))
            .transpose()?,
        vlans,
    }))
}

// ============================================================================
// Builders
// ============================================================================

fn context() -> String {
    format!("interface {}", VXLAN_INTERFACE)
}

pub fn create() -> Vec<String> {
    vec![context()]
}

pub fn delete() -> Vec<String> {
    vec![format!("no {}", context())]
}

pub fn default() -> Vec<String> {
    vec![format!("default {}", context())]
}

pub fn set_source_interface(intent: &Intent<String>) -> Vec<String> {
    in_context(context(), [attribute("vxlan source-interface", intent)])
}

pub fn set_multicast_group(intent: &Intent<String>) -> Vec<String> {
    in_context(context(), [attribute("vxlan multicast-group", intent)])
}

pub fn set_udp_port(intent: &Intent<u16>) -> Vec<String> {
    in_context(context(), [attribute("vxlan udp-port", intent)])
}

/// Binds `vlan` to `vni`.
pub fn update_vlan(vlan: u16, vni: u32) -> Vec<String> {
    in_context(context(), [format!("vxlan vlan {} vni {}", vlan, vni)])
}

/// Removes the binding, restating its VNI.
pub fn remove_vlan(vlan: u16, vni: u32) -> Vec<String> {
    in_context(context(), [format!("no vxlan vlan {} vni {}", vlan, vni)])
}

/// Replaces every VLAN to VNI binding that differs.
pub fn set_vlans(current: &BTreeMap<u16, u32>, desired: &BTreeMap<u16, u32>) -> Vec<String> {
    let removals = current
        .iter()
        .filter(|&(vlan, vni)| desired.get(vlan) != Some(vni))
        .map(|(vlan, vni)| format!("no vxlan vlan {} vni {}", vlan, vni));
    let additions = desired
        .iter()
        .filter(|&(vlan, vni)| current.get(vlan) != Some(vni))
        .map(|(vlan, vni)| format!("vxlan vlan {} vni {}", vlan, vni));

    let body: Vec<String> = removals.chain(additions).collect();
    if body.is_empty() {
        return Vec::new();
    }
    in_context(context(), body)
}
