use super::{same_members, Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::Result;
use crate::modules::switchport::{self, Switchport, SwitchportMode, DEFAULT_VLAN};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchportResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub mode: Option<SwitchportMode>,
    pub trunk_allowed_vlans: Option<Vec<String>>,
    pub trunk_native_vlan: Option<u16>,
    pub access_vlan: Option<u16>,
    pub trunk_groups: Option<Vec<String>>,
}

impl Desired for SwitchportResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct SwitchportProvider {
    name: String,
    current: Option<Switchport>,
}

impl Provider for SwitchportProvider {
    const RESOURCE_TYPE: &'static str = "switchport";
    type Desired = SwitchportResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(switchport::getall(node)?
            .into_values()
            .map(|current| Self {
                name: current.name.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &SwitchportResource) -> Result<Self> {
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

    fn create(&mut self, node: &Node, _desired: &SwitchportResource, _pending: &mut ()) -> Result<()> {
        node.apply(switchport::create(&self.name))?;
        self.current = Some(Switchport {
            name: self.name.clone(),
            mode: SwitchportMode::Access,
            trunk_allowed_vlans: Vec::new(),
            trunk_native_vlan: DEFAULT_VLAN,
            access_vlan: DEFAULT_VLAN,
            trunk_groups: Vec::new(),
        });
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(switchport::delete(&self.name))?;
        self.current = None;
        Ok(())
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &SwitchportResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        let name = self.name.clone();
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, &name);

        if let Some(mode) = desired.mode {
            if mode != current.mode {
                changes.apply("mode", switchport::set_mode(&name, &Intent::Set(mode)))?;
                current.mode = mode;
            }
        }

        if let Some(vlans) = &desired.trunk_allowed_vlans {
            if !same_members(&current.trunk_allowed_vlans, vlans) {
                changes.apply(
                    "trunk_allowed_vlans",
                    switchport::set_trunk_allowed_vlans(&name, &Intent::Set(vlans.clone())),
                )?;
                current.trunk_allowed_vlans = vlans.clone();
            }
        }

        if let Some(vlan) = desired.trunk_native_vlan {
            if vlan != current.trunk_native_vlan {
                changes.apply(
                    "trunk_native_vlan",
                    switchport::set_trunk_native_vlan(&name, &Intent::Set(vlan)),
                )?;
                current.trunk_native_vlan = vlan;
            }
        }

        if let Some(vlan) = desired.access_vlan {
            if vlan != current.access_vlan {
                changes.apply("access_vlan", switchport::set_access_vlan(&name, &Intent::Set(vlan)))?;
                current.access_vlan = vlan;
            }
        }

        if let Some(groups) = &desired.trunk_groups {
            if !same_members(&current.trunk_groups, groups) {
                changes.apply(
                    "trunk_groups",
                    switchport::set_trunk_groups(&name, &Intent::Set(groups.clone())),
                )?;
                current.trunk_groups = groups.clone();
            }
        }

        Ok(changes.into_changed())
    }
}
