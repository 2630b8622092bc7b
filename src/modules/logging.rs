//! Remote syslog destinations.

use crate::eapi::Node;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^logging host (\S+)").expect("Invalid logging host regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingHost {
    pub name: String,
}

pub fn getall(node: &Node) -> Result<BTreeMap<String, LoggingHost>> {
    Ok(parse_logging_hosts(node.running_config()?.as_str()))
}

pub fn parse_logging_hosts(config: &str) -> BTreeMap<String, LoggingHost> {
    HOST.captures_iter(config)
        .map(|caps| {
            let name = caps[1].to_string();
            (name.clone(), LoggingHost { name })
        })
        .collect()
}

// ============================================================================
// Builders
// ============================================================================

pub fn add_host(name: &str) -> Vec<String> {
    vec![format!("logging host {}", name)]
}

pub fn remove_host(name: &str) -> Vec<String> {
    vec![format!("no logging host {}", name)]
}
