//! Provider adapters: per-resource glue between a desired record and the
//! device.
//!
//! A provider is built either from an observed instance (via
//! [`Provider::instances`]) or, when the device has no such resource, from
//! [`Provider::absent`]. The reconciler then drives it through the
//! absent/present state machine:
//!
//! ```text
//! absent --create--> present --destroy--> absent
//! present --sync--> pending --flush--> applied
//! ```
//!
//! Immediate providers apply each change as soon as it is computed and use
//! `()` as their pending changeset. Deferred providers stage changes into
//! an explicit `Pending` value and issue a single command batch from
//! [`Provider::flush`].

pub mod interface;
pub mod ipinterface;
pub mod logging;
pub mod mlag;
pub mod ntp;
pub mod ospf;
pub mod prefixlist;
pub mod routemap;
pub mod staticroute;
pub mod stp;
pub mod switchport;
pub mod vlan;
pub mod vxlan;

use crate::eapi::Node;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use interface::{InterfaceProvider, InterfaceResource};
pub use ipinterface::{IpInterfaceProvider, IpInterfaceResource};
pub use logging::{LoggingHostProvider, LoggingHostResource};
pub use mlag::{MlagInterfaceProvider, MlagInterfaceResource};
pub use ntp::{NtpConfigProvider, NtpConfigResource};
pub use ospf::{
    OspfInstanceProvider, OspfInstanceResource, OspfInterfaceProvider, OspfInterfaceResource,
    OspfNetworkProvider, OspfNetworkResource,
};
pub use prefixlist::{PrefixListProvider, PrefixListResource};
pub use routemap::{RouteMapProvider, RouteMapResource};
pub use staticroute::{StaticRouteProvider, StaticRouteResource};
pub use stp::{
    MstInstanceProvider, MstInstanceResource, StpInterfaceProvider, StpInterfaceResource,
    StpProvider, StpResource,
};
pub use switchport::{SwitchportProvider, SwitchportResource};
pub use vlan::{VlanProvider, VlanResource};
pub use vxlan::{VxlanProvider, VxlanResource};

/// Whether a resource should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ensure::Present => write!(f, "present"),
            Ensure::Absent => write!(f, "absent"),
        }
    }
}

/// A desired resource record read from a manifest.
pub trait Desired {
    /// The resource identity, in the same form parsers key records by.
    fn identity(&self) -> String;

    /// Settings-only resources are always present.
    fn ensure(&self) -> Ensure {
        Ensure::Present
    }
}

/// Per-resource adapter driven by the reconciler.
pub trait Provider: Sized {
    /// Name used in reports and manifests.
    const RESOURCE_TYPE: &'static str;

    type Desired: Desired;

    /// Changes staged between `sync` and `flush`.
    type Pending: Default;

    /// Every instance of this resource type present on the device.
    fn instances(node: &Node) -> Result<Vec<Self>>;

    /// A provider for a resource the device does not have.
    fn absent(desired: &Self::Desired) -> Result<Self>;

    fn name(&self) -> String;

    /// Reflects cached state only.
    fn exists(&self) -> bool;

    fn create(
        &mut self,
        node: &Node,
        desired: &Self::Desired,
        pending: &mut Self::Pending,
    ) -> Result<()>;

    fn destroy(&mut self, node: &Node, pending: &mut Self::Pending) -> Result<()>;

    /// Brings every managed property in line with `desired`, returning the
    /// names of the properties that changed.
    fn sync(
        &mut self,
        node: &Node,
        desired: &Self::Desired,
        pending: &mut Self::Pending,
    ) -> Result<Vec<&'static str>>;

    /// Issues the staged changes.
    fn flush(&mut self, _node: &Node, _pending: Self::Pending) -> Result<()> {
        Ok(())
    }
}

/// Collects property changes made by an immediate provider.
pub(crate) struct Changes<'a> {
    node: &'a Node,
    resource: String,
    changed: Vec<&'static str>,
}

impl<'a> Changes<'a> {
    pub(crate) fn new(node: &'a Node, resource: impl Into<String>) -> Self {
        Self {
            node,
            resource: resource.into(),
            changed: Vec::new(),
        }
    }

    /// Applies `commands` and records `property` as changed.
    pub(crate) fn apply(&mut self, property: &'static str, commands: Vec<String>) -> Result<()> {
        debug!(resource = %self.resource, property, ?commands, "Applying property");
        self.node.apply(commands)?;
        self.changed.push(property);
        Ok(())
    }

    pub(crate) fn into_changed(self) -> Vec<&'static str> {
        self.changed
    }
}

/// Whether `current` and `desired` hold the same entries, ignoring order.
pub(crate) fn same_members(current: &[String], desired: &[String]) -> bool {
    let mut a: Vec<&String> = current.iter().collect();
    let mut b: Vec<&String> = desired.iter().collect();
    a.sort();
    a.dedup();
    b.sort();
    b.dedup();
    a == b
}
