use super::{Changes, Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::Result;
use crate::modules::interface::{self, Interface};
use crate::modules::{is_ethernet, Intent};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub description: Option<String>,
    pub shutdown: Option<bool>,
    /// Ethernet ports only
    pub speed: Option<String>,
    /// Ethernet ports only
    pub lacp_priority: Option<u32>,
}

impl Desired for InterfaceResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct InterfaceProvider {
    name: String,
    current: Option<Interface>,
}

impl Provider for InterfaceProvider {
    const RESOURCE_TYPE: &'static str = "interface";
    type Desired = InterfaceResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(interface::getall(node)?
            .into_values()
            .map(|current| Self {
                name: current.name.clone(),
                current: Some(current),
            })
            .collect())
    }

    fn absent(desired: &InterfaceResource) -> Result<Self> {
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

    fn create(&mut self, node: &Node, _desired: &InterfaceResource, _pending: &mut ()) -> Result<()> {
        node.apply(interface::create(&self.name)?)?;
        self.current = Some(Interface {
            name: self.name.clone(),
            description: String::new(),
            shutdown: false,
            speed: None,
            lacp_priority: None,
        });
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(interface::delete(&self.name)?)?;
        self.current = None;
        Ok(())
    }

    fn sync(
        &mut self,
        node: &Node,
        desired: &InterfaceResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        let name = self.name.clone();
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let mut changes = Changes::new(node, &name);

        if let Some(description) = desired.description.as_deref() {
            if description != current.description {
                changes.apply(
                    "description",
                    interface::set_description(&name, &Intent::from_text(Some(description), false)),
                )?;
                current.description = description.to_string();
            }
        }

        if let Some(shutdown) = desired.shutdown {
            if shutdown != current.shutdown {
                changes.apply("shutdown", interface::set_shutdown(&name, &Intent::Set(shutdown)))?;
                current.shutdown = shutdown;
            }
        }

        let ethernet = is_ethernet(&name);
        if let Some(speed) = &desired.speed {
            if !ethernet {
                warn!(interface = %name, "Ignoring speed on a non-Ethernet interface");
            } else if current.speed.as_ref() != Some(speed) {
                changes.apply("speed", interface::set_speed(&name, &Intent::Set(speed.clone())))?;
                current.speed = Some(speed.clone());
            }
        }

        if let Some(priority) = desired.lacp_priority {
            if !ethernet {
                warn!(interface = %name, "Ignoring lacp_priority on a non-Ethernet interface");
            } else if current.lacp_priority != Some(priority) {
                changes.apply(
                    "lacp_priority",
                    interface::set_lacp_priority(&name, &Intent::Set(priority)),
                )?;
                current.lacp_priority = Some(priority);
            }
        }

        Ok(changes.into_changed())
    }
}
