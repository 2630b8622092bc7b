//! Spanning-tree settings: the global mode, MST instances, and per-port
//! portfast.

use super::{Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::stp::{self, MstInstance, StpInterface};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};

/// Name of the singleton global settings resource.
pub const STP_SETTINGS: &str = "settings";

/// Priority given to an MST instance created without one.
pub const DEFAULT_MST_PRIORITY: u32 = 32768;

// ============================================================================
// Global
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StpResource {
    #[serde(default = "settings")]
    pub name: String,
    pub mode: Option<String>,
}

fn settings() -> String {
    STP_SETTINGS.to_string()
}

impl Desired for StpResource {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug)]
pub struct StpProvider {
    mode: Option<String>,
}

impl Provider for StpProvider {
    const RESOURCE_TYPE: &'static str = "stp";
    type Desired = StpResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(vec![Self {
            mode: stp::get_mode(node)?,
        }])
    }

    fn absent(desired: &StpResource) -> Result<Self> {
        Err(Error::validation(
            &desired.name,
            format!("spanning-tree settings are named '{}'", STP_SETTINGS),
        ))
    }

    fn name(&self) -> String {
        STP_SETTINGS.to_string()
    }

    fn exists(&self) -> bool {
        true
    }

    fn create(&mut self, _node: &Node, _desired: &StpResource, _pending: &mut ()) -> Result<()> {
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, _pending: &mut ()) -> Result<()> {
        Err(Error::validation(STP_SETTINGS, "global settings cannot be absent"))
    }

    fn sync(&mut self, node: &Node, desired: &StpResource, _pending: &mut ()) -> Result<Vec<&'static str>> {
        let mut changes = Changes::new(node, "spanning-tree");
        if let Some(mode) = &desired.mode {
            if self.mode.as_ref() != Some(mode) {
                changes.apply("mode", stp::set_mode(&Intent::from_text(Some(mode), false)))?;
                self.mode = Some(mode.clone()).filter(|m| !m.is_empty());
            }
        }
        Ok(changes.into_changed())
    }
}

// ============================================================================
// MST instance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MstInstanceResource {
    pub instance_id: u16,
    #[serde(default)]
    pub ensure: Ensure,
    pub priority: Option<u32>,
}

impl Desired for MstInstanceResource {
    fn identity(&self) -> String {
        self.instance_id.to_string()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct MstInstanceProvider {
    instance_id: u16,
    current: Option<MstInstance>,
}

impl Provider for MstInstanceProvider {
    const RESOURCE_TYPE: &'static str = "mst_instance";
    type Desired = MstInstanceResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(stp::mst_instances(node)?
            .into_values()
            .map(|current| Self {
                instance_id: current.instance_id,
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &MstInstanceResource) -> Result<Self> {
        Ok(Self {
            instance_id: desired.instance_id,
            current: None,
        })
    }

    fn name(&self) -> String {
        self.instance_id.to_string()
    }

    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn create(&mut self, node: &Node, desired: &MstInstanceResource, _pending: &mut ()) -> Result<()> {
        let priority = desired.priority.unwrap_or(DEFAULT_MST_PRIORITY);
        node.apply(stp::set_mst_priority(self.instance_id, &Intent::Set(priority)))?;
        self.current = Some(MstInstance {
            instance_id: self.instance_id,
            priority,
        });
        Ok(())
    }

    /// Drops the priority override and removes the instance from the region.
    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        let mut commands = stp::set_mst_priority(self.instance_id, &Intent::Clear);
        commands.extend(stp::delete_mst_instance(self.instance_id));
        node.apply(commands)?;
        self.current = None;
        Ok(())
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &MstInstanceResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        let id = self.instance_id;
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, format!("mst {}", id));
        if let Some(priority) = desired.priority {
            if priority != current.priority {
                changes.apply("priority", stp::set_mst_priority(id, &Intent::Set(priority)))?;
                current.priority = priority;
            }
        }
        Ok(changes.into_changed())
    }
}

// ============================================================================
// Interface
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StpInterfaceResource {
    pub name: String,
    pub portfast: Option<bool>,
}

impl Desired for StpInterfaceResource {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug)]
pub struct StpInterfaceProvider {
    name: String,
    current: Option<StpInterface>,
}

impl Provider for StpInterfaceProvider {
    const RESOURCE_TYPE: &'static str = "stp_interface";
    type Desired = StpInterfaceResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(stp::interfaces(node)?
            .into_values()
            .map(|current| Self {
                name: current.name.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &StpInterfaceResource) -> Result<Self> {
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

    fn create(&mut self, _node: &Node, _desired: &StpInterfaceResource, _pending: &mut ()) -> Result<()> {
        Err(Error::validation(&self.name, "interface is not a bridged port"))
    }

    fn destroy(&mut self, _node: &Node, _pending: &mut ()) -> Result<()> {
        Err(Error::validation(&self.name, "stp_interface cannot be absent"))
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &StpInterfaceResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        let name = self.name.clone();
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, &name);
        if let Some(portfast) = desired.portfast {
            if portfast != current.portfast {
                changes.apply("portfast", stp::set_portfast(&name, &Intent::Set(portfast)))?;
                current.portfast = portfast;
            }
        }
        Ok(changes.into_changed())
    }
}
