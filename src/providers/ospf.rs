//! OSPF instances, per-interface OSPF settings, and network statements.

use super::{same_members, Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::ospf::{self, NetworkType, OspfInstance, OspfInterface, OspfNetwork, Redistribution};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Instance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OspfInstanceResource {
    pub instance_id: u32,
    #[serde(default)]
    pub ensure: Ensure,
    pub router_id: Option<String>,
    pub max_lsa: Option<u32>,
    pub maximum_paths: Option<u32>,
    pub passive_interface_default: Option<bool>,
    pub active_interfaces: Option<Vec<String>>,
    pub passive_interfaces: Option<Vec<String>>,
    /// Protocol to optional route-map
    pub redistribution: Option<BTreeMap<String, Redistribution>>,
}

impl Desired for OspfInstanceResource {
    fn identity(&self) -> String {
        self.instance_id.to_string()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct OspfInstanceProvider {
    instance_id: u32,
    current: Option<OspfInstance>,
}

impl Provider for OspfInstanceProvider {
    const RESOURCE_TYPE: &'static str = "ospf_instance";
    type Desired = OspfInstanceResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(ospf::getall(node)?
            .into_values()
            .map(|current| Self {
                instance_id: current.instance_id,
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &OspfInstanceResource) -> Result<Self> {
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

    fn create(&mut self, node: &Node, _desired: &OspfInstanceResource, _pending: &mut ()) -> Result<()> {
        node.apply(ospf::create(self.instance_id))?;
        self.current = Some(OspfInstance {
            instance_id: self.instance_id,
            ..OspfInstance::default()
        });
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(ospf::delete(self.instance_id))?;
        self.current = None;
        Ok(())
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &OspfInstanceResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        let id = self.instance_id;
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, format!("router ospf {}", id));

        if let Some(router_id) = desired.router_id.as_deref() {
            if router_id != current.router_id {
                changes.apply(
                    "router_id",
                    ospf::set_router_id(id, &Intent::from_text(Some(router_id), false)),
                )?;
                current.router_id = router_id.to_string();
            }
        }

        if let Some(max_lsa) = desired.max_lsa {
            if current.max_lsa != Some(max_lsa) {
                changes.apply("max_lsa", ospf::set_max_lsa(id, &Intent::Set(max_lsa)))?;
                current.max_lsa = Some(max_lsa);
            }
        }

        if let Some(paths) = desired.maximum_paths {
            if current.maximum_paths != Some(paths) {
                changes.apply("maximum_paths", ospf::set_maximum_paths(id, &Intent::Set(paths)))?;
                current.maximum_paths = Some(paths);
            }
        }

        sync_passive(&mut changes, current, desired)?;

        if let Some(redistribution) = &desired.redistribution {
            if *redistribution != current.redistribution {
                let mut commands = Vec::new();
                for protocol in current.redistribution.keys() {
                    if !redistribution.contains_key(protocol) {
                        commands.extend(ospf::remove_redistribution(id, protocol));
                    }
                }
                for (protocol, attrs) in redistribution {
                    if current.redistribution.get(protocol) != Some(attrs) {
                        commands.extend(ospf::add_redistribution(
                            id,
                            protocol,
                            attrs.route_map.as_deref(),
                        ));
                    }
                }
                changes.apply("redistribution", commands)?;
                current.redistribution = redistribution.clone();
            }
        }

        Ok(changes.into_changed())
    }
}

/// Converges the passive default and the interfaces listed as exceptions
/// to it. Flipping the default resets every old exception.
fn sync_passive(
    changes: &mut Changes<'_>,
    current: &mut OspfInstance,
    desired: &OspfInstanceResource,
) -> Result<()> {
    let id = current.instance_id;
    let passive_default = desired
        .passive_interface_default
        .unwrap_or(current.passive_interface_default);
    let flipped = passive_default != current.passive_interface_default;

    if flipped {
        changes.apply(
            "passive_interface_default",
            ospf::set_passive_interface_default(id, &Intent::Set(passive_default)),
        )?;
    }

    let all = current.all_interfaces();
    let wanted = desired_exceptions(desired, passive_default, &all)?;
    let existing = current.interface_exceptions().to_vec();

    let exceptions = match &wanted {
        Some(wanted) if flipped || !same_members(&existing, wanted) => Some(wanted.clone()),
        None if flipped && !existing.is_empty() => Some(Vec::new()),
        _ => None,
    };

    if let Some(exceptions) = exceptions {
        let listed = (
            desired.active_interfaces.is_some(),
            desired.passive_interfaces.is_some(),
        );
        let property = match listed {
            (true, false) => "active_interfaces",
            (false, true) => "passive_interfaces",
            _ if passive_default => "active_interfaces",
            _ => "passive_interfaces",
        };
        changes.apply(
            property,
            ospf::set_interface_exceptions(id, passive_default, &existing, &exceptions),
        )?;
    }

    if flipped || wanted.is_some() {
        let exceptions: Vec<String> = match wanted {
            Some(list) => list,
            None if flipped => Vec::new(),
            None => existing,
        };
        let rest: Vec<String> = all
            .into_iter()
            .filter(|name| !exceptions.contains(name))
            .collect();
        current.passive_interface_default = passive_default;
        if passive_default {
            current.active_interfaces = exceptions;
            current.passive_interfaces = rest;
        } else {
            current.passive_interfaces = exceptions;
            current.active_interfaces = rest;
        }
    }
    Ok(())
}

/// Resolves the desired interface lists into the exceptions to
/// `passive_default`. A list naming the default side is turned into its
/// complement over the OSPF-enabled interfaces.
fn desired_exceptions(
    desired: &OspfInstanceResource,
    passive_default: bool,
    all: &BTreeSet<String>,
) -> Result<Option<Vec<String>>> {
    let active = desired.active_interfaces.as_ref();
    let passive = desired.passive_interfaces.as_ref();

    if let (Some(active), Some(passive)) = (active, passive) {
        if let Some(both) = active.iter().find(|name| passive.contains(name)) {
            return Err(Error::validation(
                desired.instance_id.to_string(),
                format!("{} is listed as both active and passive", both),
            ));
        }
    }

    let (exceptions, defaults) = if passive_default {
        (active, passive)
    } else {
        (passive, active)
    };
    Ok(match (exceptions, defaults) {
        (Some(list), _) => Some(list.clone()),
        (None, Some(list)) => Some(
            all.iter()
                .filter(|name| !list.contains(name))
                .cloned()
                .collect(),
        ),
        (None, None) => None,
    })
}

// ============================================================================
// Interface
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OspfInterfaceResource {
    pub name: String,
    pub network_type: Option<NetworkType>,
}

impl Desired for OspfInterfaceResource {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug)]
pub struct OspfInterfaceProvider {
    name: String,
    current: Option<OspfInterface>,
}

impl Provider for OspfInterfaceProvider {
    const RESOURCE_TYPE: &'static str = "ospf_interface";
    type Desired = OspfInterfaceResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(ospf::interfaces(node)?
            .into_values()
            .map(|current| Self {
                name: current.name.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &OspfInterfaceResource) -> Result<Self> {
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

    fn create(&mut self, _node: &Node, _desired: &OspfInterfaceResource, _pending: &mut ()) -> Result<()> {
        Err(Error::validation(
            &self.name,
            "interface is not configured or is a management port",
        ))
    }

    fn destroy(&mut self, _node: &Node, _pending: &mut ()) -> Result<()> {
        Err(Error::validation(&self.name, "ospf_interface cannot be absent"))
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &OspfInterfaceResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        let name = self.name.clone();
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, &name);

        if let Some(network_type) = desired.network_type {
            if network_type != current.network_type {
                changes.apply(
                    "network_type",
                    ospf::set_network_type(&name, &Intent::Set(network_type)),
                )?;
                current.network_type = network_type;
            }
        }

        Ok(changes.into_changed())
    }
}

// ============================================================================
// Network
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OspfNetworkResource {
    /// Network in `<address>/<masklen>` form
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub area: Option<String>,
    pub instance_id: Option<u32>,
}

impl Desired for OspfNetworkResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

/// Staged changes to one network statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OspfNetworkPending {
    pub ensure: Option<Ensure>,
    pub area: Option<String>,
    pub instance_id: Option<u32>,
}

#[derive(Debug)]
pub struct OspfNetworkProvider {
    name: String,
    current: Option<OspfNetwork>,
}

impl OspfNetworkProvider {
    fn stage(&self, desired: &OspfNetworkResource, pending: &mut OspfNetworkPending) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(area) = &desired.area {
            if self.current.as_ref().map(|n| &n.area) != Some(area) {
                pending.area = Some(area.clone());
                changed.push("area");
            }
        }
        if let Some(id) = desired.instance_id {
            if self.current.as_ref().map(|n| n.instance_id) != Some(id) {
                pending.instance_id = Some(id);
                changed.push("instance_id");
            }
        }
        changed
    }
}

/// The statement `pending` leaves behind, filling unset fields from
/// `current`.
fn merged_network(
    name: &str,
    current: Option<&OspfNetwork>,
    pending: &OspfNetworkPending,
) -> Result<OspfNetwork> {
    let area = pending
        .area
        .clone()
        .or_else(|| current.map(|n| n.area.clone()))
        .ok_or_else(|| Error::validation(name, "area is required"))?;
    let instance_id = pending
        .instance_id
        .or_else(|| current.map(|n| n.instance_id))
        .ok_or_else(|| Error::validation(name, "instance_id is required"))?;
    ospf::validate_area(&area)?;

    Ok(OspfNetwork {
        network: name.to_string(),
        area,
        instance_id,
    })
}

/// Commands that realize `pending` against the current statement.
pub fn flush_network(
    name: &str,
    current: Option<&OspfNetwork>,
    pending: &OspfNetworkPending,
) -> Result<Vec<String>> {
    if pending.ensure == Some(Ensure::Absent) {
        return Ok(current
            .map(|n| ospf::remove_network(n.instance_id, &n.network, &n.area))
            .unwrap_or_default());
    }

    let desired = merged_network(name, current, pending)?;
    Ok(match current {
        Some(current) if *current == desired => Vec::new(),
        Some(current) => ospf::move_network(current, &desired),
        None => ospf::add_network(desired.instance_id, &desired.network, &desired.area),
    })
}

impl Provider for OspfNetworkProvider {
    const RESOURCE_TYPE: &'static str = "ospf_network";
    type Desired = OspfNetworkResource;
    type Pending = OspfNetworkPending;

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(ospf::networks(node)?
            .into_values()
            .map(|current| Self {
                name: current.network.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &OspfNetworkResource) -> Result<Self> {
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
        desired: &OspfNetworkResource,
        pending: &mut OspfNetworkPending,
    ) -> Result<()> {
        pending.ensure = Some(Ensure::Present);
        self.stage(desired, pending);
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, pending: &mut OspfNetworkPending) -> Result<()> {
        pending.ensure = Some(Ensure::Absent);
        Ok(())
    }

    fn sync(
        &mut self,
        _node: &Node,
        desired: &OspfNetworkResource,
        pending: &mut OspfNetworkPending,
    ) -> Result<Vec<&'static str>> {
        Ok(self.stage(desired, pending))
    }

    fn flush(&mut self, node: &Node, pending: OspfNetworkPending) -> Result<()> {
        if pending == OspfNetworkPending::default() {
            return Ok(());
        }
        let commands = flush_network(&self.name, self.current.as_ref(), &pending)?;
        node.apply(commands)?;
        self.current = match pending.ensure {
            Some(Ensure::Absent) => None,
            _ => Some(merged_network(&self.name, self.current.as_ref(), &pending)?),
        };
        Ok(())
    }
}
