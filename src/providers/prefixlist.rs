use super::{Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::prefixlist::{self, PrefixListRule};
use crate::modules::Action;
use serde::{Deserialize, Serialize};

/// One prefix-list rule, named `<list>:<seqno>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixListResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub action: Option<Action>,
    pub prefix: Option<String>,
    pub masklen: Option<u8>,
    pub eq: Option<u8>,
    pub ge: Option<u8>,
    pub le: Option<u8>,
}

impl Desired for PrefixListResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

/// Staged changes to one rule. Length bounds are doubly optional so that a
/// bound can be staged for removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixListPending {
    pub ensure: Option<Ensure>,
    pub action: Option<Action>,
    pub prefix: Option<String>,
    pub masklen: Option<u8>,
    pub eq: Option<Option<u8>>,
    pub ge: Option<Option<u8>>,
    pub le: Option<Option<u8>>,
}

#[derive(Debug)]
pub struct PrefixListProvider {
    list: String,
    seqno: u32,
    current: Option<PrefixListRule>,
}

impl PrefixListProvider {
    fn stage(&self, desired: &PrefixListResource, pending: &mut PrefixListPending) -> Vec<&'static str> {
        let current = self.current.as_ref();
        let mut changed = Vec::new();

        if let Some(action) = desired.action {
            if current.map(|r| r.action) != Some(action) {
                pending.action = Some(action);
                changed.push("action");
            }
        }
        if let Some(prefix) = &desired.prefix {
            if current.map(|r| &r.prefix) != Some(prefix) {
                pending.prefix = Some(prefix.clone());
                changed.push("prefix");
            }
        }
        if let Some(masklen) = desired.masklen {
            if current.map(|r| r.masklen) != Some(masklen) {
                pending.masklen = Some(masklen);
                changed.push("masklen");
            }
        }

        // Bounds are only managed as a group once any of them is given.
        if desired.eq.is_some() || desired.ge.is_some() || desired.le.is_some() {
            let bounds = [
                ("eq", desired.eq, current.and_then(|r| r.eq), &mut pending.eq),
                ("ge", desired.ge, current.and_then(|r| r.ge), &mut pending.ge),
                ("le", desired.le, current.and_then(|r| r.le), &mut pending.le),
            ];
            for (field, wanted, have, slot) in bounds {
                if wanted != have {
                    *slot = Some(wanted);
                    changed.push(field);
                }
            }
        }
        changed
    }
}

/// The rule `pending` describes once merged over `current`.
pub fn merge_prefix_list(
    list: &str,
    seqno: u32,
    current: Option<&PrefixListRule>,
    pending: &PrefixListPending,
) -> Result<PrefixListRule> {
    let identity = prefixlist::identity(list, seqno);
    let missing = |field: &str| Error::validation(&identity, format!("{} is required", field));
    let rule = PrefixListRule {
        seqno,
        action: pending
            .action
            .or_else(|| current.map(|r| r.action))
            .ok_or_else(|| missing("action"))?,
        prefix: pending
            .prefix
            .clone()
            .or_else(|| current.map(|r| r.prefix.clone()))
            .ok_or_else(|| missing("prefix"))?,
        masklen: pending
            .masklen
            .or_else(|| current.map(|r| r.masklen))
            .ok_or_else(|| missing("masklen"))?,
        eq: pending.eq.unwrap_or_else(|| current.and_then(|r| r.eq)),
        ge: pending.ge.unwrap_or_else(|| current.and_then(|r| r.ge)),
        le: pending.le.unwrap_or_else(|| current.and_then(|r| r.le)),
    };
    rule.validate(list)?;
    Ok(rule)
}

/// Commands that realize `pending` against the current rule. Removal
/// restates the full current rule.
pub fn flush_prefix_list(
    list: &str,
    seqno: u32,
    current: Option<&PrefixListRule>,
    pending: &PrefixListPending,
) -> Result<Vec<String>> {
    if pending.ensure == Some(Ensure::Absent) {
        return Ok(current
            .map(|rule| prefixlist::remove_rule(list, rule))
            .unwrap_or_default());
    }
    let desired = merge_prefix_list(list, seqno, current, pending)?;
    Ok(prefixlist::update_rule(list, current, &desired))
}

impl Provider for PrefixListProvider {
    const RESOURCE_TYPE: &'static str = "prefix_list";
    type Desired = PrefixListResource;
    type Pending = PrefixListPending;

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(prefixlist::getall(node)?
            .into_iter()
            .flat_map(|(list, rules)| {
                rules.into_values().map(move |rule| Self {
                    list: list.clone(),
                    seqno: rule.seqno,
                    current: Some(rule),
                })
            })
            .collect())
    }

    fn absent(desired: &PrefixListResource) -> Result<Self> {
        let (list, seqno) = prefixlist::parse_identity(&desired.name)?;
        Ok(Self {
            list,
            seqno,
            current: None,
        })
    }

    fn name(&self) -> String {
        prefixlist::identity(&self.list, self.seqno)
    }

    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn create(
        &mut self,
        _node: &Node,
        desired: &PrefixListResource,
        pending: &mut PrefixListPending,
    ) -> Result<()> {
        pending.ensure = Some(Ensure::Present);
        self.stage(desired, pending);
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, pending: &mut PrefixListPending) -> Result<()> {
        pending.ensure = Some(Ensure::Absent);
        Ok(())
    }

    fn sync(
        &mut self,
        _node: &Node,
        desired: &PrefixListResource,
        pending: &mut PrefixListPending,
    ) -> Result<Vec<&'static str>> {
        Ok(self.stage(desired, pending))
    }

    fn flush(&mut self, node: &Node, pending: PrefixListPending) -> Result<()> {
        if pending == PrefixListPending::default() {
            return Ok(());
        }
        let commands = flush_prefix_list(&self.list, self.seqno, self.current.as_ref(), &pending)?;
        node.apply(commands)?;
        self.current = match pending.ensure {
            Some(Ensure::Absent) => None,
            _ => Some(merge_prefix_list(&self.list, self.seqno, self.current.as_ref(), &pending)?),
        };
        Ok(())
    }
}
