use super::{same_members, Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::Result;
use crate::modules::vlan::{self, Vlan, VlanState};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VlanResource {
    pub vlan_id: u16,
    #[serde(default)]
    pub ensure: Ensure,
    pub vlan_name: Option<String>,
    pub state: Option<VlanState>,
    pub trunk_groups: Option<Vec<String>>,
}

impl Desired for VlanResource {
    fn identity(&self) -> String {
        self.vlan_id.to_string()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct VlanProvider {
    vlan_id: u16,
    current: Option<Vlan>,
}

impl Provider for VlanProvider {
    const RESOURCE_TYPE: &'static str = "vlan";
    type Desired = VlanResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(vlan::getall(node)?
            .into_values()
            .map(|current| Self {
                vlan_id: current.vlan_id,
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &VlanResource) -> Result<Self> {
        Ok(Self {
            vlan_id: desired.vlan_id,
            current: None,
        })
    }

    fn name(&self) -> String {
        self.vlan_id.to_string()
    }

    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn create(&mut self, node: &Node, _desired: &VlanResource, _pending: &mut ()) -> Result<()> {
        node.apply(vlan::create(self.vlan_id))?;
        self.current = Some(Vlan {
            vlan_id: self.vlan_id,
            name: format!("VLAN{:04}", self.vlan_id),
            state: VlanState::Active,
            trunk_groups: Vec::new(),
        });
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(vlan::delete(self.vlan_id))?;
        self.current = None;
        Ok(())
    }

    fn sync(&mut self, node: &Node, desired: &VlanResource, _pending: &mut ()) -> Result<Vec<&'static str>> {
        let id = self.vlan_id;
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, format!("vlan {}", id));

        if let Some(name) = desired.vlan_name.as_deref() {
            if name != current.name {
                changes.apply("vlan_name", vlan::set_name(id, &Intent::from_text(Some(name), false)))?;
                current.name = name.to_string();
            }
        }

        if let Some(state) = desired.state {
            if state != current.state {
                changes.apply("state", vlan::set_state(id, &Intent::Set(state)))?;
                current.state = state;
            }
        }

        if let Some(groups) = &desired.trunk_groups {
            if !same_members(&current.trunk_groups, groups) {
                changes.apply("trunk_groups", vlan::set_trunk_groups(id, &Intent::Set(groups.clone())))?;
                current.trunk_groups = groups.clone();
            }
        }

        Ok(changes.into_changed())
    }
}
