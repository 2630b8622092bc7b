//! Route-map rules.
//!
//! A rule is identified by `<name>:<seqno>`; its action and sequence number
//! come from the `route-map` header line itself.

use super::{attribute, capture, capture_all, in_context, parse_number, Action, Intent};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(route-map (\S+) (\S+) (\S+))$").expect("Invalid route-map regex")
});
static MATCH_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+match (.+)$").expect("Invalid match regex"));
static SET_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+set (.+)$").expect("Invalid set regex"));
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+description (.+)$").expect("Invalid description regex"));
static CONTINUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+continue (\d+)$").expect("Invalid continue regex"));

/// Observed state of one route-map rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMapRule {
    pub action: Action,
    pub seqno: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_seqno: Option<u32>,
    #[serde(rename = "match", default)]
    pub match_rules: Vec<String>,
    #[serde(rename = "set", default)]
    pub set_rules: Vec<String>,
}

impl RouteMapRule {
    /// A rule with no body.
    pub fn new(action: Action, seqno: u32) -> Self {
        Self {
            action,
            seqno,
            description: None,
            continue_seqno: None,
            match_rules: Vec::new(),
            set_rules: Vec::new(),
        }
    }
}

/// Route-map rules by name, then sequence number.
pub type RouteMaps = BTreeMap<String, BTreeMap<u32, RouteMapRule>>;

/// Composite identity of a rule.
pub fn identity(name: &str, seqno: u32) -> String {
    format!("{}:{}", name, seqno)
}

/// Splits a `<name>:<seqno>` identity.
pub fn parse_identity(identity: &str) -> Result<(String, u32)> {
    let (name, seqno) = identity.rsplit_once(':').ok_or_else(|| {
        Error::validation(
            "route_map",
            format!("'{}' is not of the form <name>:<seqno>", identity),
        )
    })?;
    if name.is_empty() {
        return Err(Error::validation("route_map", "route map name is empty"));
    }
    Ok((name.to_string(), parse_number("route_map", "seqno", seqno)?))
}

/// Every route-map rule.
pub fn getall(node: &Node) -> Result<RouteMaps> {
    parse_route_maps(node.running_config()?.as_str())
}

/// One rule, if configured.
pub fn get(node: &Node, name: &str, seqno: u32) -> Result<Option<RouteMapRule>> {
    Ok(getall(node)?
        .get_mut(name)
        .and_then(|rules| rules.remove(&seqno)))
}

/// Parses every `route-map` block.
pub fn parse_route_maps(config: &str) -> Result<RouteMaps> {
    let mut maps = RouteMaps::new();
    for caps in HEADER.captures_iter(config) {
        let name = &caps[2];
        let resource = format!("route-map {}", name);
        let action: Action = caps[3]
            .parse()
            .map_err(|_| Error::validation(&resource, format!("unknown action '{}'", &caps[3])))?;
        let seqno: u32 = parse_number(&resource, "seqno", &caps[4])?;

        let Some(block) = extract_block(config, &caps[1]) else {
            continue;
        };

        let rule = RouteMapRule {
            action,
            seqno,
            description: capture(&DESCRIPTION, block).map(str::to_string),
            continue_seqno: capture(&CONTINUE, block)
                .map(|raw| parse_number(&resource, "continue", raw))
                .transpose()?,
            match_rules: capture_all(&MATCH_RULE, block),
            set_rules: capture_all(&SET_RULE, block),
        };
        maps.entry(name.to_string()).or_default().insert(seqno, rule);
    }
    Ok(maps)
}

// ============================================================================
// Builders
// ============================================================================

fn context(name: &str, action: Action, seqno: u32) -> String {
    format!("route-map {} {} {}", name, action, seqno)
}

pub fn create(name: &str, action: Action, seqno: u32) -> Vec<String> {
    vec![context(name, action, seqno)]
}

/// Removes the rule, restating its action.
pub fn delete(name: &str, action: Action, seqno: u32) -> Vec<String> {
    vec![format!("no {}", context(name, action, seqno))]
}

/// Re-enters the rule with a new action.
pub fn update_action(name: &str, seqno: u32, action: Action) -> Vec<String> {
    vec![context(name, action, seqno)]
}

fn replace_lines(keyword: &str, current: &[String], desired: &[String]) -> Vec<String> {
    current
        .iter()
        .map(|rule| format!("no {} {}", keyword, rule))
        .chain(desired.iter().map(|rule| format!("{} {}", keyword, rule)))
        .collect()
}

/// Replaces every match rule. Each current rule is negated in full.
pub fn set_match_rules(
    name: &str,
    action: Action,
    seqno: u32,
    current: &[String],
    desired: &[String],
) -> Vec<String> {
    in_context(
        context(name, action, seqno),
        replace_lines("match", current, desired),
    )
}

/// Replaces every set rule. Each current rule is negated in full.
pub fn set_set_rules(
    name: &str,
    action: Action,
    seqno: u32,
    current: &[String],
    desired: &[String],
) -> Vec<String> {
    in_context(
        context(name, action, seqno),
        replace_lines("set", current, desired),
    )
}

pub fn set_description(name: &str, action: Action, seqno: u32, intent: &Intent<String>) -> Vec<String> {
    in_context(context(name, action, seqno), [attribute("description", intent)])
}

pub fn set_continue(name: &str, action: Action, seqno: u32, intent: &Intent<u32>) -> Vec<String> {
    in_context(context(name, action, seqno), [attribute("continue", intent)])
}

/// One batch converging `current` to `desired` under a single context.
pub fn converge(name: &str, current: Option<&RouteMapRule>, desired: &RouteMapRule) -> Vec<String> {
    let empty = RouteMapRule::new(desired.action, desired.seqno);
    let base = current.unwrap_or(&empty);
    let mut body = Vec::new();

    if base.description != desired.description {
        let intent = Intent::from_text(desired.description.as_deref(), false);
        body.push(attribute("description", &intent));
    }
    if base.continue_seqno != desired.continue_seqno {
        body.push(attribute("continue", &Intent::from_value(desired.continue_seqno, false)));
    }
    if base.match_rules != desired.match_rules {
        body.extend(replace_lines("match", &base.match_rules, &desired.match_rules));
    }
    if base.set_rules != desired.set_rules {
        body.extend(replace_lines("set", &base.set_rules, &desired.set_rules));
    }

    let action_changed = current.map_or(false, |c| c.action != desired.action);
    if current.is_some() && !action_changed && body.is_empty() {
        return Vec::new();
    }
    in_context(context(name, desired.action, desired.seqno), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = "\
route-map TEST permit 10
   description first rule
   match ip address prefix-list PL_A
   match tag 100
   set local-preference 200
   continue 20
!
route-map TEST deny 20
!
route-map OTHER permit 5
   set community 65000:1
!
";

    #[test]
    fn test_parse_route_maps() {
        let maps = parse_route_maps(CONFIG).unwrap();
        assert_eq!(maps.len(), 2);
        let rule = &maps["TEST"][&10];
        assert_eq!(
            rule,
            &RouteMapRule {
                action: Action::Permit,
                seqno: 10,
                description: Some("first rule".into()),
                continue_seqno: Some(20),
                match_rules: vec!["ip address prefix-list PL_A".into(), "tag 100".into()],
                set_rules: vec!["local-preference 200".into()],
            }
        );
        assert_eq!(maps["TEST"][&20], RouteMapRule::new(Action::Deny, 20));
        assert_eq!(maps["OTHER"][&5].set_rules, vec!["community 65000:1"]);
    }

    #[test]
    fn test_bad_seqno_fails_read() {
        let config = "route-map TEST permit ten\n!\n";
        assert!(matches!(
            parse_route_maps(config).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn test_identity() {
        assert_eq!(identity("TEST", 10), "TEST:10");
        assert_eq!(parse_identity("TEST:10").unwrap(), ("TEST".to_string(), 10));
        assert!(parse_identity("TEST").is_err());
        assert!(parse_identity(":10").is_err());
        assert!(parse_identity("TEST:x").is_err());
    }

    #[test]
    fn test_delete_restates_action() {
        assert_eq!(delete("TEST", Action::Deny, 20), vec!["no route-map TEST deny 20"]);
    }

    #[test]
    fn test_set_match_rules_negates_each_rule() {
        let current = vec!["tag 100".to_string()];
        let desired = vec!["tag 200".to_string(), "as 65000".to_string()];
        assert_eq!(
            set_match_rules("TEST", Action::Permit, 10, &current, &desired),
            vec![
                "route-map TEST permit 10",
                "no match tag 100",
                "match tag 200",
                "match as 65000",
            ]
        );
    }

    #[test]
    fn test_converge_new_rule() {
        let mut desired = RouteMapRule::new(Action::Permit, 30);
        desired.set_rules = vec!["metric 10".into()];
        assert_eq!(
            converge("TEST", None, &desired),
            vec!["route-map TEST permit 30", "set metric 10"]
        );
    }

    #[test]
    fn test_converge_unchanged_is_empty() {
        let maps = parse_route_maps(CONFIG).unwrap();
        let rule = &maps["TEST"][&10];
        assert!(converge("TEST", Some(rule), rule).is_empty());
    }

    #[test]
    fn test_converge_action_and_description() {
        let maps = parse_route_maps(CONFIG).unwrap();
        let current = &maps["TEST"][&10];
        let mut desired = current.clone();
        desired.action = Action::Deny;
        desired.description = None;
        assert_eq!(
            converge("TEST", Some(current), &desired),
            vec!["route-map TEST deny 10", "no description"]
        );
    }

    #[test]
    fn test_attribute_builders() {
        assert_eq!(
            set_continue("TEST", Action::Permit, 10, &Intent::Set(30))[1],
            "continue 30"
        );
        assert_eq!(
            set_description("TEST", Action::Permit, 10, &Intent::Clear)[1],
            "no description"
        );
        assert_eq!(update_action("TEST", 10, Action::Deny), vec!["route-map TEST deny 10"]);
    }
}
