//! IPv4 static routes, identified by `<prefix>/<masklen>/<nexthop>`.

use super::parse_number;
use crate::eapi::Node;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

static ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^ip route ([^/\s]+)/(\d+) (\S+)(?: (\d+))?(?: tag (\d+))?(?: name (\S+))?\s*$",
    )
    .expect("Invalid ip route regex")
});

/// Administrative distance when none is configured.
pub const DEFAULT_DISTANCE: u8 = 1;

/// Route tag when none is configured.
pub const DEFAULT_TAG: u32 = 0;

/// One static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    pub prefix: String,
    pub masklen: u8,
    pub next_hop: String,
    pub distance: u8,
    pub tag: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
}

impl StaticRoute {
    /// The route's composite identity.
    pub fn identity(&self) -> String {
        identity(&self.prefix, self.masklen, &self.next_hop)
    }

    /// Checks the mask length. A zero length is the default route.
    pub fn validate(&self) -> Result<()> {
        if self.masklen > 32 {
            return Err(Error::validation(
                self.identity(),
                format!("masklen {} is out of range 0-32", self.masklen),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for StaticRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ip route {}/{} {}", self.prefix, self.masklen, self.next_hop)?;
        if self.distance != DEFAULT_DISTANCE {
            write!(f, " {}", self.distance)?;
        }
        if self.tag != DEFAULT_TAG {
            write!(f, " tag {}", self.tag)?;
        }
        if let Some(name) = &self.route_name {
            write!(f, " name {}", name)?;
        }
        Ok(())
    }
}

/// Composite identity of a route.
pub fn identity(prefix: &str, masklen: u8, next_hop: &str) -> String {
    format!("{}/{}/{}", prefix, masklen, next_hop)
}

/// Splits a `<prefix>/<masklen>/<nexthop>` identity.
pub fn parse_identity(identity: &str) -> Result<(String, u8, String)> {
    let parts: Vec<&str> = identity.splitn(3, '/').collect();
    match parts.as_slice() {
        [prefix, masklen, next_hop] if !prefix.is_empty() && !next_hop.is_empty() => Ok((
            prefix.to_string(),
            parse_number("static_route", "masklen", masklen)?,
            next_hop.to_string(),
        )),
        _ => Err(Error::validation(
            "static_route",
            format!("'{}' is not of the form <prefix>/<masklen>/<nexthop>", identity),
        )),
    }
}

/// Every static route, keyed by identity.
pub fn getall(node: &Node) -> Result<BTreeMap<String, StaticRoute>> {
    parse_static_routes(node.running_config()?.as_str())
}

/// Parses every `ip route` line.
pub fn parse_static_routes(config: &str) -> Result<BTreeMap<String, StaticRoute>> {
    let mut routes = BTreeMap::new();
    for caps in ROUTE.captures_iter(config) {
        let resource = format!("ip route {}/{}", &caps[1], &caps[2]);
        let route = StaticRoute {
            prefix: caps[1].to_string(),
            masklen: parse_number(&resource, "masklen", &caps[2])?,
            next_hop: caps[3].to_string(),
            distance: caps
                .get(4)
                .map(|m| parse_number(&resource, "distance", m.as_str()))
                .transpose()?
                .unwrap_or(DEFAULT_DISTANCE),
            tag: caps
                .get(5)
                .map(|m| parse_number(&resource, "tag", m.as_str()))
                .transpose()?
                .unwrap_or(DEFAULT_TAG),
            route_name: caps.get(6).map(|m| m.as_str().to_string()),
        };
        routes.insert(route.identity(), route);
    }
    Ok(routes)
}

// ============================================================================
// Builders
// ============================================================================

pub fn add_route(route: &StaticRoute) -> Vec<String> {
    vec![route.to_string()]
}

/// Negates the route, restating its distance, tag and name.
pub fn remove_route(route: &StaticRoute) -> Vec<String> {
    vec![format!("no {}", route)]
}

/// Replaces the current route (if any) with `desired`.
pub fn update_route(current: Option<&StaticRoute>, desired: &StaticRoute) -> Vec<String> {
    match current {
        Some(route) if route == desired => Vec::new(),
        Some(route) => {
            let mut commands = remove_route(route);
            commands.extend(add_route(desired));
            commands
        }
        None => add_route(desired),
    }
}
