use super::{same_members, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::routemap::{self, RouteMapRule};
use crate::modules::Action;
use serde::{Deserialize, Serialize};

/// One route-map rule, named `<map>:<seqno>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteMapResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub action: Option<Action>,
    pub description: Option<String>,
    #[serde(rename = "continue")]
    pub continue_seqno: Option<u32>,
    #[serde(rename = "match")]
    pub match_rules: Option<Vec<String>>,
    #[serde(rename = "set")]
    pub set_rules: Option<Vec<String>>,
}

impl Desired for RouteMapResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMapPending {
    pub ensure: Option<Ensure>,
    pub action: Option<Action>,
    pub description: Option<Option<String>>,
    pub continue_seqno: Option<u32>,
    pub match_rules: Option<Vec<String>>,
    pub set_rules: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct RouteMapProvider {
    map: String,
    seqno: u32,
    current: Option<RouteMapRule>,
}

impl RouteMapProvider {
    fn stage(&self, desired: &RouteMapResource, pending: &mut RouteMapPending) -> Vec<&'static str> {
        let current = self.current.as_ref();
        let mut changed = Vec::new();

        if let Some(action) = desired.action {
            if current.map(|r| r.action) != Some(action) {
                pending.action = Some(action);
                changed.push("action");
            }
        }
        if let Some(description) = &desired.description {
            let description = Some(description.clone()).filter(|d| !d.is_empty());
            if current.and_then(|r| r.description.clone()) != description {
                pending.description = Some(description);
                changed.push("description");
            }
        }
        if let Some(seqno) = desired.continue_seqno {
            if current.and_then(|r| r.continue_seqno) != Some(seqno) {
                pending.continue_seqno = Some(seqno);
                changed.push("continue");
            }
        }
        if let Some(rules) = &desired.match_rules {
            let have = current.map(|r| r.match_rules.as_slice()).unwrap_or_default();
            if !same_members(have, rules) {
                pending.match_rules = Some(rules.clone());
                changed.push("match");
            }
        }
        if let Some(rules) = &desired.set_rules {
            let have = current.map(|r| r.set_rules.as_slice()).unwrap_or_default();
            if !same_members(have, rules) {
                pending.set_rules = Some(rules.clone());
                changed.push("set");
            }
        }
        changed
    }
}

/// The rule once `pending` is merged over `current`. A new rule needs an
/// action.
pub fn merge_route_map(
    map: &str,
    seqno: u32,
    current: Option<&RouteMapRule>,
    pending: &RouteMapPending,
) -> Result<RouteMapRule> {
    let base = match current {
        Some(rule) => rule.clone(),
        None => {
            let action = pending.action.ok_or_else(|| {
                Error::validation(routemap::identity(map, seqno), "action is required")
            })?;
            RouteMapRule::new(action, seqno)
        }
    };

    Ok(RouteMapRule {
        action: pending.action.unwrap_or(base.action),
        seqno,
        description: pending.description.clone().unwrap_or(base.description),
        continue_seqno: pending.continue_seqno.or(base.continue_seqno),
        match_rules: pending.match_rules.clone().unwrap_or(base.match_rules),
        set_rules: pending.set_rules.clone().unwrap_or(base.set_rules),
    })
}

/// Commands that realize `pending`, entering the rule's context once.
pub fn flush_route_map(
    map: &str,
    seqno: u32,
    current: Option<&RouteMapRule>,
    pending: &RouteMapPending,
) -> Result<Vec<String>> {
    if pending.ensure == Some(Ensure::Absent) {
        return Ok(current
            .map(|rule| routemap::delete(map, rule.action, seqno))
            .unwrap_or_default());
    }
    let desired = merge_route_map(map, seqno, current, pending)?;
    Ok(routemap::converge(map, current, &desired))
}

impl Provider for RouteMapProvider {
    const RESOURCE_TYPE: &'static str = "route_map";
    type Desired = RouteMapResource;
    type Pending = RouteMapPending;

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(routemap::getall(node)?
            .into_iter()
            .flat_map(|(map, rules)| {
                rules.into_values().map(move |rule| Self {
                    map: map.clone(),
                    seqno: rule.seqno,
                    current: Some(rule),
                })
            })
            .collect())
    }

    fn absent(desired: &RouteMapResource) -> Result<Self> {
        let (map, seqno) = routemap::parse_identity(&desired.name)?;
        Ok(Self {
            map,
            seqno,
            current: None,
        })
    }

    fn name(&self) -> String {
        routemap::identity(&self.map, self.seqno)
    }

    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn create(
        &mut self,
        _node: &Node,
        desired: &RouteMapResource,
        pending: &mut RouteMapPending,
    ) -> Result<()> {
        pending.ensure = Some(Ensure::Present);
        self.stage(desired, pending);
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, pending: &mut RouteMapPending) -> Result<()> {
        pending.ensure = Some(Ensure::Absent);
        Ok(())
    }

    fn sync(
        &mut self,
        _node: &Node,
        desired: &RouteMapResource,
        pending: &mut RouteMapPending,
    ) -> Result<Vec<&'static str>> {
        Ok(self.stage(desired, pending))
    }

    fn flush(&mut self, node: &Node, pending: RouteMapPending) -> Result<()> {
        if pending == RouteMapPending::default() {
            return Ok(());
        }
        let current = self.current.as_ref();
        node.apply(flush_route_map(&self.map, self.seqno, current, &pending)?)?;
        self.current = match pending.ensure {
            Some(Ensure::Absent) => None,
            _ => Some(merge_route_map(&self.map, self.seqno, self.current.as_ref(), &pending)?),
        };
        Ok(())
    }
}
