use super::{Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::Result;
use crate::modules::logging;
use serde::{Deserialize, Serialize};

/// A syslog destination, named by address or host name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingHostResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
}

impl Desired for LoggingHostResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug)]
pub struct LoggingHostProvider {
    name: String,
    exists: bool,
}

impl Provider for LoggingHostProvider {
    const RESOURCE_TYPE: &'static str = "logging_host";
    type Desired = LoggingHostResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(logging::getall(node)?
            .into_keys()
            .map(|name| Self { name, exists: true })
            .collect())
    }

    fn absent(desired: &LoggingHostResource) -> Result<Self> {
        Ok(Self {
            name: desired.name.clone(),
            exists: false,
        })
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn exists(&self) -> bool {
        self.exists
    }

    fn create(&mut self, node: &Node, _desired: &LoggingHostResource, _pending: &mut ()) -> Result<()> {
        node.apply(logging::add_host(&self.name))?;
        self.exists = true;
        Ok(())
    }

    fn destroy(&mut self, node: &Node, _pending: &mut ()) -> Result<()> {
        node.apply(logging::remove_host(&self.name))?;
        self.exists = false;
        Ok(())
    }

    fn sync(
        &mut self,
        _node: &Node,
        _desired: &LoggingHostResource,
        _pending: &mut (),
    ) -> Result<Vec<&'static str>> {
        Ok(Vec::new())
    }
}
