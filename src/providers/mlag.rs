use super::{Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::mlag::{self, MlagInterface};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MlagInterfaceResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub mlag_id: Option<u32>,
}

impl Desired for MlagInterfaceResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MlagPending {
    pub ensure: Option<Ensure>,
    pub mlag_id: Option<u32>,
}

#[derive(Debug)]
pub struct MlagInterfaceProvider {
    name: String,
    current: Option<MlagInterface>,
}

/// Commands that realize `pending` for interface `name`.
pub fn flush_mlag(name: &str, current: Option<&MlagInterface>, pending: &MlagPending) -> Result<Vec<String>> {
    if pending.ensure == Some(Ensure::Absent) {
        return Ok(match current {
            Some(_) => mlag::set_mlag_id(name, &Intent::Clear),
            None => Vec::new(),
        });
    }
    match (pending.mlag_id, current) {
        (Some(id), _) => Ok(mlag::set_mlag_id(name, &Intent::Set(id))),
        (None, Some(_)) => Ok(Vec::new()),
        (None, None) => Err(Error::validation(name, "mlag_id is required")),
    }
}

impl Provider for MlagInterfaceProvider {
    const RESOURCE_TYPE: &'static str = "mlag_interface";
    type Desired = MlagInterfaceResource;
    type Pending = MlagPending;

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(mlag::getall(node)?
            .into_values()
            .map(|current| Self {
                name: current.name.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &MlagInterfaceResource) -> Result<Self> {
        Ok(Self {
            name: desired.name.clone(),
            current: None,
        })
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn create(
        &mut self,
        _node: &Node,
        desired: &MlagInterfaceResource,
        pending: &mut MlagPending,
    ) -> Result<()> {
        pending.ensure = Some(Ensure::Present);
        pending.mlag_id = desired.mlag_id;
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, pending: &mut MlagPending) -> Result<()> {
        pending.ensure = Some(Ensure::Absent);
        Ok(())
    }

    fn sync(
        &mut self,
        _node: &Node,
        desired: &MlagInterfaceResource,
        pending: &mut MlagPending,
    ) -> Result<Vec<&'static str>> {
        match (desired.mlag_id, &self.current) {
            (Some(id), Some(current)) if current.mlag_id != id => {
                pending.mlag_id = Some(id);
                Ok(vec!["mlag_id"])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn flush(&mut self, node: &Node, pending: MlagPending) -> Result<()> {
        if pending == MlagPending::default() {
            return Ok(());
        }
        node.apply(flush_mlag(&self.name, self.current.as_ref(), &pending)?)?;
        self.current = match (pending.ensure, pending.mlag_id) {
            (Some(Ensure::Absent), _) => None,
            (_, Some(mlag_id)) => Some(MlagInterface {
                name: self.name.clone(),
                mlag_id,
            }),
            _ => self.current.take(),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flush_mlag() {
        let current = MlagInterface {
            name: "Port-Channel10".into(),
            mlag_id: 10,
        };
        let update = MlagPending {
            ensure: None,
            mlag_id: Some(11),
        };
        assert_eq!(
            flush_mlag("Port-Channel10", Some(&current), &update).unwrap(),
            vec!["interface Port-Channel10", "mlag 11"]
        );

        let remove = MlagPending {
            ensure: Some(Ensure::Absent),
            mlag_id: None,
        };
        assert_eq!(
            flush_mlag("Port-Channel10", Some(&current), &remove).unwrap(),
            vec!["interface Port-Channel10", "no mlag"]
        );
    }

    #[test]
    fn test_create_requires_id() {
        let pending = MlagPending {
            ensure: Some(Ensure::Present),
            mlag_id: None,
        };
        assert!(flush_mlag("Port-Channel10", None, &pending).is_err());
    }
}
