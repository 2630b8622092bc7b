use super::{same_members, Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::Result;
use crate::modules::ipinterface::{self, IpInterface};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};

/// Addressing of a routed interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpInterfaceResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    /// `<address>/<masklen>`; empty removes the address
    pub address: Option<String>,
    pub mtu: Option<u32>,
    /// Replaces the whole relay list; empty removes every helper
    pub helper_addresses: Option<Vec<String>>,
}

impl IpInterfaceResource {
    fn validate(&self) -> Result<()> {
        if let Some(address) = self.address.as_deref().filter(|a| !a.is_empty()) {
            ipinterface::validate_address(&self.name, address)?;
        }
        if let Some(mtu) = self.mtu {
            ipinterface::validate_mtu(&self.name, mtu)?;
        }
        Ok(())
    }
}

impl Desired for IpInterfaceResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct IpInterfaceProvider {
    name: String,
    current: Option<IpInterface>,
}

impl Provider for IpInterfaceProvider {
    const RESOURCE_TYPE: &'static str = "ipinterface";
    type Desired = IpInterfaceResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(ipinterface::getall(node)?
            .into_values()
            .map(|current| Self {
                name: current.name.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &IpInterfaceResource) -> Result<Self> {
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

    fn create(&mut self, node: &Node, desired: &IpInterfaceResource, _pending: &mut ()) -> Result<()> {
        desired.validate()?;
        node.apply(ipinterface::create(&self.name))?;
        self.current = Some(IpInterface {
            name: self.name.clone(),
            ..IpInterface::default()
        });
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(ipinterface::delete(&self.name))?;
        self.current = None;
        Ok(())
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &IpInterfaceResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        desired.validate()?;
        let name = self.name.clone();
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, &name);

        if let Some(address) = desired.address.as_deref() {
            if address != current.address {
                changes.apply(
                    "address",
                    ipinterface::set_address(&name, &Intent::from_text(Some(address), false)),
                )?;
                current.address = address.to_string();
            }
        }

        if let Some(mtu) = desired.mtu {
            if current.mtu != Some(mtu) {
                changes.apply("mtu", ipinterface::set_mtu(&name, &Intent::Set(mtu)))?;
                current.mtu = Some(mtu);
            }
        }

        if let Some(helpers) = &desired.helper_addresses {
            if !same_members(&current.helper_addresses, helpers) {
                changes.apply(
                    "helper_addresses",
                    ipinterface::set_helper_addresses(&name, &Intent::Set(helpers.clone())),
                )?;
                current.helper_addresses = helpers.clone();
            }
        }

        Ok(changes.into_changed())
    }
}
