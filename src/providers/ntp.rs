use super::{Changes, Desired, Provider};
use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::modules::ntp::{self, NtpConfig, NTP_SETTINGS};
use crate::modules::Intent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NtpConfigResource {
    #[serde(default = "settings")]
    pub name: String,
    /// An empty string removes the source interface
    pub source_interface: Option<String>,
}

fn settings() -> String {
    NTP_SETTINGS.to_string()
}

impl Desired for NtpConfigResource {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug)]
pub struct NtpConfigProvider {
    current: NtpConfig,
}

impl Provider for NtpConfigProvider {
    const RESOURCE_TYPE: &'static str = "ntp_config";
    type Desired = NtpConfigResource;
    type Pending = ();

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(vec![Self {
            current: ntp::get(node)?,
        }])
    }

    fn absent(desired: &NtpConfigResource) -> Result<Self> {
        Err(Error::validation(
            &desired.name,
            format!("NTP settings are named '{}'", NTP_SETTINGS),
        ))
    }

    fn name(&self) -> String {
        self.current.name.clone()
    }

    fn exists(&self) -> bool {
        true
    }

    fn create(&mut self, _node: &Node, _desired: &NtpConfigResource, _pending: &mut ()) -> Result<()> {
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, _pending: &mut ()) -> Result<()> {
        Err(Error::validation(NTP_SETTINGS, "global settings cannot be absent"))
    }

    fn sync(&mut self, node: &Node, desired: &NtpConfigResource, _pending: &mut ()) -> Result<Vec<&'static str>> {
        let mut changes = Changes::new(node, "ntp");
        if let Some(source) = desired.source_interface.as_deref() {
            ntp::validate_source_interface(source)?;
            if source != self.current.source_interface {
                changes.apply(
                    "source_interface",
                    ntp::set_source_interface(&Intent::from_text(Some(source), false)),
                )?;
                self.current.source_interface = source.to_string();
            }
        }
        Ok(changes.into_changed())
    }
}
