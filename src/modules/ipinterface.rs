//! Layer 3 interface addressing: primary address, MTU and DHCP relay
//! helpers.
//!
//! An interface is routed unless its block carries a bare `switchport`
//! line. Layer 2 ports are left to the switchport family.

use super::{attribute, capture, capture_all, in_context, parse_number, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

static INTERFACE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^interface (.+)$").expect("Invalid interface regex"));
static SWITCHPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+switchport$").expect("Invalid switchport regex"));
static ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+ip address (\S+)$").expect("Invalid ip address regex"));
static MTU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+mtu (\d+)$").expect("Invalid mtu regex"));
static HELPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+ip helper-address (\S+)").expect("Invalid ip helper-address regex")
});

/// Smallest and largest MTU EOS accepts on a routed port.
pub const MTU_RANGE: std::ops::RangeInclusive<u32> = 68..=9216;

/// Observed state of one routed interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInterface {
    pub name: String,
    /// Primary address in `<address>/<masklen>` form; empty when unset
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    pub helper_addresses: Vec<String>,
}

/// Every routed interface in the running configuration.
pub fn getall(node: &Node) -> Result<BTreeMap<String, IpInterface>> {
    parse_ipinterfaces(node.running_config()?.as_str())
}

/// Parses every `interface` block that is not a switchport.
pub fn parse_ipinterfaces(config: &str) -> Result<BTreeMap<String, IpInterface>> {
    let mut interfaces = BTreeMap::new();
    for caps in INTERFACE_NAME.captures_iter(config) {
        if let Some(interface) = parse_ipinterface(config, &caps[1])? {
            interfaces.insert(interface.name.clone(), interface);
        }
    }
    Ok(interfaces)
}

/// Parses the block for `name`. Missing blocks and switchports yield
/// `None`.
pub fn parse_ipinterface(config: &str, name: &str) -> Result<Option<IpInterface>> {
    let Some(block) = extract_block(config, &format!("interface {}", name)) else {
        return Ok(None);
    };
    if SWITCHPORT.is_match(block) {
        return Ok(None);
    }

    Ok(Some(IpInterface {
        name: name.to_string(),
        address: capture(&ADDRESS, block).unwrap_or_default().to_string(),
        mtu: capture(&MTU, block)
            .map(|raw| parse_number(name, "mtu", raw))
            .transpose()?,
        helper_addresses: capture_all(&HELPER, block),
    }))
}

/// Checks an `<address>/<masklen>` string.
pub fn validate_address(name: &str, address: &str) -> Result<()> {
    let valid = address
        .split_once('/')
        .map(|(ip, len)| {
            ip.parse::<Ipv4Addr>().is_ok() && len.parse::<u8>().map_or(false, |len| len <= 32)
        })
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(Error::validation(
            name,
            format!("address '{}' is not in <address>/<masklen> form", address),
        ))
    }
}

pub fn validate_mtu(name: &str, mtu: u32) -> Result<()> {
    if MTU_RANGE.contains(&mtu) {
        Ok(())
    } else {
        Err(Error::validation(
            name,
            format!(
                "mtu {} is out of range {}-{}",
                mtu,
                MTU_RANGE.start(),
                MTU_RANGE.end()
            ),
        ))
    }
}

// ============================================================================
// Builders
// ============================================================================

fn context(name: &str) -> String {
    format!("interface {}", name)
}

/// Turns the port into a routed interface.
pub fn create(name: &str) -> Vec<String> {
    in_context(context(name), ["no switchport".to_string()])
}

/// Drops the address and returns the port to layer 2.
pub fn delete(name: &str) -> Vec<String> {
    in_context(
        context(name),
        ["no ip address".to_string(), "switchport".to_string()],
    )
}

pub fn set_address(name: &str, intent: &Intent<String>) -> Vec<String> {
    in_context(context(name), [attribute("ip address", intent)])
}

pub fn set_mtu(name: &str, intent: &Intent<u32>) -> Vec<String> {
    in_context(context(name), [attribute("mtu", intent)])
}

/// Replaces the helper list: every existing helper is removed before the
/// desired ones are added.
pub fn set_helper_addresses(name: &str, intent: &Intent<Vec<String>>) -> Vec<String> {
    let body: Vec<String> = match intent {
        Intent::Default => vec!["default ip helper-address".to_string()],
        Intent::Clear => vec!["no ip helper-address".to_string()],
        Intent::Set(helpers) => std::iter::once("no ip helper-address".to_string())
            .chain(helpers.iter().map(|h| format!("ip helper-address {}", h)))
            .collect(),
    };
    in_context(context(name), body)
}
