use super::{Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::vxlan::{self, Vxlan, VXLAN_INTERFACE};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VxlanResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub source_interface: Option<String>,
    pub multicast_group: Option<String>,
    pub udp_port: Option<u16>,
    /// VLAN to VNI bindings
    pub vlans: Option<BTreeMap<u16, u32>>,
}

impl Desired for VxlanResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct VxlanProvider {
    current: Option<Vxlan>,
}

impl Provider for VxlanProvider {
    const RESOURCE_TYPE: &'static str = "vxlan";
    type Desired = VxlanResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(vxlan::get(node)?
            .map(|current| Self {
                current: Some(current),
            })
            .into_iter()
            .collect())
    }

    fn absent(desired: &VxlanResource) -> Result<Self> {
        if desired.name != VXLAN_INTERFACE {
            return Err(Error::validation(
                &desired.name,
                format!("the VXLAN interface must be named {}", VXLAN_INTERFACE),
            ));
        }
        Ok(Self { current: None })
    }

    fn name(&self) -> String {
        VXLAN_INTERFACE.to_string()
    }

    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn create(&mut self, node: &Node, _desired: &VxlanResource, _pending: &mut ()) -> Result<()> {
        node.apply(vxlan::create())?;
        self.current = Some(Vxlan {
            name: VXLAN_INTERFACE.to_string(),
            source_interface: String::new(),
            multicast_group: String::new(),
            udp_port: None,
            vlans: BTreeMap::new(),
        });
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(vxlan::delete())?;
        self.current = None;
        Ok(())
    }

    fn sync(&mut self, node: &Node, desired: &VxlanResource, _pending: &mut ()) -> Result<Vec<&'static str>> {
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, VXLAN_INTERFACE);

        if let Some(source) = desired.source_interface.as_deref() {
            if source != current.source_interface {
                changes.apply(
                    "source_interface",
                    vxlan::set_source_interface(&Intent::from_text(Some(source), false)),
                )?;
                current.source_interface = source.to_string();
            }
        }

        if let Some(group) = desired.multicast_group.as_deref() {
            if group != current.multicast_group {
                changes.apply(
                    "multicast_group",
                    vxlan::set_multicast_group(&Intent::from_text(Some(group), false)),
                )?;
                current.multicast_group = group.to_string();
            }
        }

        if let Some(port) = desired.udp_port {
            if current.udp_port != Some(port) {
                changes.apply("udp_port", vxlan::set_udp_port(&Intent::Set(port)))?;
                current.udp_port = Some(port);
            }
        }

        if let Some(vlans) = &desired.vlans {
            let commands = vxlan::set_vlans(&current.vlans, vlans);
            if !commands.is_empty() {
                changes.apply("vlans", commands)?;
                current.vlans = vlans.clone();
            }
        }

        Ok(changes.into_changed())
    }
}
