//! IP prefix-list rules.
//!
//! EOS renders a prefix-list either as flat `ip prefix-list <name> seq ...`
//! lines or as an `ip prefix-list <name>` block of `seq` lines; both forms
//! are read. Rules are always written back in the flat form, and removing a
//! rule restates it in full.

use super::{parse_number, Action};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::running_config::extract_block;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const RULE: &str =
    r"seq (\d+) (permit|deny) ([^/\s]+)/(\d+)(?: eq (\d+))?(?: ge (\d+))?(?: le (\d+))?\s*$";

static FLAT_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?m)^ip prefix-list (\S+) {}", RULE))
        .expect("Invalid prefix-list rule regex")
});
static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ip prefix-list (\S+)$").expect("Invalid prefix-list header regex")
});
static BLOCK_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?m)^\s+{}", RULE)).expect("Invalid prefix-list rule regex")
});

/// Largest IPv4 mask length.
pub const MAX_MASKLEN: u8 = 32;

/// One prefix-list rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixListRule {
    pub seqno: u32,
    pub action: Action,
    pub prefix: String,
    pub masklen: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ge: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub le: Option<u8>,
}

impl PrefixListRule {
    /// Checks the numeric ranges of the rule.
    pub fn validate(&self, name: &str) -> Result<()> {
        let resource = identity(name, self.seqno);
        if self.seqno > u16::MAX as u32 {
            return Err(Error::validation(
                &resource,
                format!("seqno {} is out of range 0-65535", self.seqno),
            ));
        }
        let lengths = [
            ("masklen", Some(self.masklen)),
            ("eq", self.eq),
            ("ge", self.ge),
            ("le", self.le),
        ];
        for (field, value) in lengths {
            if let Some(len) = value.filter(|len| *len > MAX_MASKLEN) {
                return Err(Error::validation(
                    &resource,
                    format!("{} {} is out of range 0-{}", field, len, MAX_MASKLEN),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for PrefixListRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seq {} {} {}/{}",
            self.seqno, self.action, self.prefix, self.masklen
        )?;
        if let Some(eq) = self.eq {
            write!(f, " eq {}", eq)?;
        }
        if let Some(ge) = self.ge {
            write!(f, " ge {}", ge)?;
        }
        if let Some(le) = self.le {
            write!(f, " le {}", le)?;
        }
        Ok(())
    }
}

/// Prefix-list rules by list name, then sequence number.
pub type PrefixLists = BTreeMap<String, BTreeMap<u32, PrefixListRule>>;

/// Composite identity of a rule.
pub fn identity(name: &str, seqno: u32) -> String {
    format!("{}:{}", name, seqno)
}

/// Splits a `<name>:<seqno>` identity.
pub fn parse_identity(identity: &str) -> Result<(String, u32)> {
    let (name, seqno) = identity.rsplit_once(':').ok_or_else(|| {
        Error::validation(
            "prefix_list",
            format!("'{}' is not of the form <name>:<seqno>", identity),
        )
    })?;
    if name.is_empty() {
        return Err(Error::validation("prefix_list", "prefix list name is empty"));
    }
    Ok((name.to_string(), parse_number("prefix_list", "seqno", seqno)?))
}

/// Every prefix-list rule.
pub fn getall(node: &Node) -> Result<PrefixLists> {
    parse_prefix_lists(node.running_config()?.as_str())
}

/// One rule, if configured.
pub fn get(node: &Node, name: &str, seqno: u32) -> Result<Option<PrefixListRule>> {
    Ok(getall(node)?
        .get_mut(name)
        .and_then(|rules| rules.remove(&seqno)))
}

fn rule_from(name: &str, caps: &Captures<'_>, offset: usize) -> Result<PrefixListRule> {
    let resource = format!("ip prefix-list {}", name);
    let group = |i: usize| caps.get(offset + i).map(|m| m.as_str());
    let length = |i: usize, field: &str| -> Result<Option<u8>> {
        group(i)
            .map(|raw| parse_number(&resource, field, raw))
            .transpose()
    };

    Ok(PrefixListRule {
        seqno: parse_number(&resource, "seqno", group(1).unwrap_or_default())?,
        action: group(2).unwrap_or_default().parse()?,
        prefix: group(3).unwrap_or_default().to_string(),
        masklen: parse_number(&resource, "masklen", group(4).unwrap_or_default())?,
        eq: length(5, "eq")?,
        ge: length(6, "ge")?,
        le: length(7, "le")?,
    })
}

/// Parses prefix-lists in both flat and block form.
pub fn parse_prefix_lists(config: &str) -> Result<PrefixLists> {
    let mut lists = PrefixLists::new();

    for caps in FLAT_RULE.captures_iter(config) {
        let name = &caps[1];
        let rule = rule_from(name, &caps, 1)?;
        lists.entry(name.to_string()).or_default().insert(rule.seqno, rule);
    }

    for caps in BLOCK_HEADER.captures_iter(config) {
        let name = &caps[1];
        let Some(block) = extract_block(config, &caps[0]) else {
            continue;
        };
        for rule_caps in BLOCK_RULE.captures_iter(block) {
            let rule = rule_from(name, &rule_caps, 0)?;
            lists.entry(name.to_string()).or_default().insert(rule.seqno, rule);
        }
    }

    Ok(lists)
}

// ============================================================================
// Builders
// ============================================================================

/// The full configuration line for a rule.
pub fn rule_line(name: &str, rule: &PrefixListRule) -> String {
    format!("ip prefix-list {} {}", name, rule)
}

pub fn add_rule(name: &str, rule: &PrefixListRule) -> Vec<String> {
    vec![rule_line(name, rule)]
}

/// Negates the rule, restating every field.
pub fn remove_rule(name: &str, rule: &PrefixListRule) -> Vec<String> {
    vec![format!("no {}", rule_line(name, rule))]
}

/// Replaces the current rule (if any) with `desired`.
pub fn update_rule(
    name: &str,
    current: Option<&PrefixListRule>,
    desired: &PrefixListRule,
) -> Vec<String> {
    match current {
        Some(rule) if rule == desired => Vec::new(),
        Some(rule) => {
            let mut commands = remove_rule(name, rule);
            commands.extend(add_rule(name, desired));
            commands
        }
        None => add_rule(name, desired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = "\
ip prefix-list MYLIST seq 10 permit 10.0.0.0/24
ip prefix-list MYLIST seq 20 deny 10.1.0.0/16 ge 24 le 28
!
ip prefix-list BLOCKED
   seq 5 deny 192.168.0.0/16 le 32
   seq 10 permit 0.0.0.0/0 eq 8
!
";

    fn rule(seqno: u32, action: Action, prefix: &str, masklen: u8) -> PrefixListRule {
        PrefixListRule {
            seqno,
            action,
            prefix: prefix.into(),
            masklen,
            eq: None,
            ge: None,
            le: None,
        }
    }

    #[test]
    fn test_parse_flat_form() {
        let lists = parse_prefix_lists(CONFIG).unwrap();
        assert_eq!(lists["MYLIST"][&10], rule(10, Action::Permit, "10.0.0.0", 24));
        let second = &lists["MYLIST"][&20];
        assert_eq!(second.ge, Some(24));
        assert_eq!(second.le, Some(28));
        assert_eq!(second.eq, None);
    }

    #[test]
    fn test_parse_block_form() {
        let lists = parse_prefix_lists(CONFIG).unwrap();
        assert_eq!(lists["BLOCKED"].len(), 2);
        assert_eq!(lists["BLOCKED"][&5].le, Some(32));
        assert_eq!(lists["BLOCKED"][&10].eq, Some(8));
        assert_eq!(lists["BLOCKED"][&10].prefix, "0.0.0.0");
    }

    #[test]
    fn test_oversized_seqno_fails_read() {
        let config = "ip prefix-list BAD seq 99999999999 permit 10.0.0.0/8\n";
        assert!(parse_prefix_lists(config).is_err());
    }

    #[test]
    fn test_identity() {
        assert_eq!(identity("MYLIST", 10), "MYLIST:10");
        assert_eq!(parse_identity("MYLIST:10").unwrap(), ("MYLIST".into(), 10));
        assert!(parse_identity("MYLIST").is_err());
    }

    #[test]
    fn test_remove_restates_rule() {
        let rule = rule(10, Action::Permit, "10.0.0.0", 24);
        assert_eq!(
            remove_rule("MYLIST", &rule),
            vec!["no ip prefix-list MYLIST seq 10 permit 10.0.0.0/24"]
        );
    }

    #[test]
    fn test_update_rule_removes_then_adds() {
        let current = rule(10, Action::Permit, "10.0.0.0", 24);
        let mut desired = current.clone();
        desired.le = Some(30);
        assert_eq!(
            update_rule("MYLIST", Some(&current), &desired),
            vec![
                "no ip prefix-list MYLIST seq 10 permit 10.0.0.0/24",
                "ip prefix-list MYLIST seq 10 permit 10.0.0.0/24 le 30",
            ]
        );
        assert!(update_rule("MYLIST", Some(&current), &current).is_empty());
    }

    #[test]
    fn test_validate_ranges() {
        let mut r = rule(10, Action::Permit, "10.0.0.0", 24);
        assert!(r.validate("MYLIST").is_ok());
        r.le = Some(33);
        assert!(r.validate("MYLIST").is_err());
        let r = rule(70000, Action::Permit, "10.0.0.0", 24);
        assert!(r.validate("MYLIST").is_err());
    }
}
