//! Manifest loading and the convergence loop.
//!
//! A manifest is a YAML list of resource records tagged by `type`. Each
//! record is converged independently: a resource that fails validation or
//! is rejected by the device is reported as failed and the run moves on,
//! while a transport failure aborts the whole run.

use crate::eapi::Node;
use crate::error::{Error, Result};
use crate::providers::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// Manifest
// ============================================================================

/// One desired resource, tagged by resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    Interface(InterfaceResource),
    Ipinterface(IpInterfaceResource),
    Switchport(SwitchportResource),
    Vlan(VlanResource),
    OspfInstance(OspfInstanceResource),
    OspfInterface(OspfInterfaceResource),
    OspfNetwork(OspfNetworkResource),
    RouteMap(RouteMapResource),
    PrefixList(PrefixListResource),
    StaticRoute(StaticRouteResource),
    Vxlan(VxlanResource),
    Stp(StpResource),
    MstInstance(MstInstanceResource),
    StpInterface(StpInterfaceResource),
    MlagInterface(MlagInterfaceResource),
    NtpConfig(NtpConfigResource),
    LoggingHost(LoggingHostResource),
}

impl Resource {
    /// Resource type name, as used in manifests and reports.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::Interface(_) => InterfaceProvider::RESOURCE_TYPE,
            Resource::Ipinterface(_) => IpInterfaceProvider::RESOURCE_TYPE,
            Resource::Switchport(_) => SwitchportProvider::RESOURCE_TYPE,
            Resource::Vlan(_) => VlanProvider::RESOURCE_TYPE,
            Resource::OspfInstance(_) => OspfInstanceProvider::RESOURCE_TYPE,
            Resource::OspfInterface(_) => OspfInterfaceProvider::RESOURCE_TYPE,
            Resource::OspfNetwork(_) => OspfNetworkProvider::RESOURCE_TYPE,
            Resource::RouteMap(_) => RouteMapProvider::RESOURCE_TYPE,
            Resource::PrefixList(_) => PrefixListProvider::RESOURCE_TYPE,
            Resource::StaticRoute(_) => StaticRouteProvider::RESOURCE_TYPE,
            Resource::Vxlan(_) => VxlanProvider::RESOURCE_TYPE,
            Resource::Stp(_) => StpProvider::RESOURCE_TYPE,
            Resource::MstInstance(_) => MstInstanceProvider::RESOURCE_TYPE,
            Resource::StpInterface(_) => StpInterfaceProvider::RESOURCE_TYPE,
            Resource::MlagInterface(_) => MlagInterfaceProvider::RESOURCE_TYPE,
            Resource::NtpConfig(_) => NtpConfigProvider::RESOURCE_TYPE,
            Resource::LoggingHost(_) => LoggingHostProvider::RESOURCE_TYPE,
        }
    }

    /// The resource identity.
    pub fn identity(&self) -> String {
        match self {
            Resource::Interface(r) => r.identity(),
            Resource::Ipinterface(r) => r.identity(),
            Resource::Switchport(r) => r.identity(),
            Resource::Vlan(r) => r.identity(),
            Resource::OspfInstance(r) => r.identity(),
            Resource::OspfInterface(r) => r.identity(),
            Resource::OspfNetwork(r) => r.identity(),
            Resource::RouteMap(r) => r.identity(),
            Resource::PrefixList(r) => r.identity(),
            Resource::StaticRoute(r) => r.identity(),
            Resource::Vxlan(r) => r.identity(),
            Resource::Stp(r) => r.identity(),
            Resource::MstInstance(r) => r.identity(),
            Resource::StpInterface(r) => r.identity(),
            Resource::MlagInterface(r) => r.identity(),
            Resource::NtpConfig(r) => r.identity(),
            Resource::LoggingHost(r) => r.identity(),
        }
    }

    /// Converges this resource, returning the changed properties.
    pub fn converge(&self, node: &Node) -> Result<Vec<&'static str>> {
        match self {
            Resource::Interface(r) => converge::<InterfaceProvider>(node, r),
            Resource::Ipinterface(r) => converge::<IpInterfaceProvider>(node, r),
            Resource::Switchport(r) => converge::<SwitchportProvider>(node, r),
            Resource::Vlan(r) => converge::<VlanProvider>(node, r),
            Resource::OspfInstance(r) => converge::<OspfInstanceProvider>(node, r),
            Resource::OspfInterface(r) => converge::<OspfInterfaceProvider>(node, r),
            Resource::OspfNetwork(r) => converge::<OspfNetworkProvider>(node, r),
            Resource::RouteMap(r) => converge::<RouteMapProvider>(node, r),
            Resource::PrefixList(r) => converge::<PrefixListProvider>(node, r),
            Resource::StaticRoute(r) => converge::<StaticRouteProvider>(node, r),
            Resource::Vxlan(r) => converge::<VxlanProvider>(node, r),
            Resource::Stp(r) => converge::<StpProvider>(node, r),
            Resource::MstInstance(r) => converge::<MstInstanceProvider>(node, r),
            Resource::StpInterface(r) => converge::<StpInterfaceProvider>(node, r),
            Resource::MlagInterface(r) => converge::<MlagInterfaceProvider>(node, r),
            Resource::NtpConfig(r) => converge::<NtpConfigProvider>(node, r),
            Resource::LoggingHost(r) => converge::<LoggingHostProvider>(node, r),
        }
    }
}

/// An ordered list of desired resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub resources: Vec<Resource>,
}

impl Manifest {
    /// Parses a manifest from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest_error = |message: String| Error::Manifest {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
        let manifest: Manifest =
            serde_yaml::from_str(&text).map_err(|e| manifest_error(e.to_string()))?;
        debug!(path = %path.display(), resources = manifest.resources.len(), "Loaded manifest");
        Ok(manifest)
    }
}

// ============================================================================
// Convergence
// ============================================================================

/// Runs the absent/present state machine for one desired resource.
pub fn converge<P: Provider>(node: &Node, desired: &P::Desired) -> Result<Vec<&'static str>> {
    let name = desired.identity();
    let mut provider = match P::instances(node)?.into_iter().find(|p| p.name() == name) {
        Some(provider) => provider,
        None => P::absent(desired)?,
    };
    let mut pending = P::Pending::default();

    let changed = match (provider.exists(), desired.ensure()) {
        (false, Ensure::Present) => {
            debug!(resource_type = P::RESOURCE_TYPE, %name, "Creating");
            provider.create(node, desired, &mut pending)?;
            let mut changed = vec!["ensure"];
            changed.extend(provider.sync(node, desired, &mut pending)?);
            changed
        }
        (true, Ensure::Absent) => {
            debug!(resource_type = P::RESOURCE_TYPE, %name, "Destroying");
            provider.destroy(node, &mut pending)?;
            vec!["ensure"]
        }
        (true, Ensure::Present) => provider.sync(node, desired, &mut pending)?,
        (false, Ensure::Absent) => Vec::new(),
    };

    provider.flush(node, pending)?;
    Ok(changed)
}

// ============================================================================
// Report
// ============================================================================

/// Result status of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Already in the desired state
    Ok,
    /// Converged with changes
    Changed,
    /// Convergence failed
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Changed => write!(f, "changed"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// Result of converging one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub resource_type: String,
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcomes of one run, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn ok(&self) -> usize {
        self.count(Status::Ok)
    }

    pub fn changed(&self) -> usize {
        self.count(Status::Changed)
    }

    pub fn failed(&self) -> usize {
        self.count(Status::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Converges every resource in `manifest`. Resource-scoped failures are
/// recorded; transport failures abort the run.
pub fn apply(node: &Node, manifest: &Manifest) -> Result<Report> {
    let mut report = Report::default();

    for resource in &manifest.resources {
        let resource_type = resource.resource_type();
        let name = resource.identity();

        let outcome = match resource.converge(node) {
            Ok(changed) => {
                let status = if changed.is_empty() {
                    Status::Ok
                } else {
                    Status::Changed
                };
                info!(resource_type, %name, %status, ?changed, "Converged resource");
                Outcome {
                    resource_type: resource_type.to_string(),
                    name,
                    status,
                    changed: changed.into_iter().map(str::to_string).collect(),
                    error: None,
                }
            }
            Err(err) if err.is_recoverable() => {
                warn!(resource_type, %name, error = %err, "Resource failed");
                node.invalidate();
                Outcome {
                    resource_type: resource_type.to_string(),
                    name,
                    status: Status::Failed,
                    changed: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
            Err(err) => return Err(err),
        };
        report.outcomes.push(outcome);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::Action;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
- type: interface
  name: Ethernet1
  description: uplink
- type: prefix_list
  name: MYLIST:10
  ensure: absent
- type: route_map
  name: TEST:10
  action: permit
  match:
    - tag 100
- type: ntp_config
  source_interface: Loopback0
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.resources.len(), 4);
        assert_eq!(manifest.resources[0].resource_type(), "interface");
        assert_eq!(manifest.resources[1].identity(), "MYLIST:10");
        match &manifest.resources[2] {
            Resource::RouteMap(r) => {
                assert_eq!(r.action, Some(Action::Permit));
                assert_eq!(r.match_rules, Some(vec!["tag 100".to_string()]));
            }
            other => panic!("unexpected resource {:?}", other),
        }
        assert_eq!(manifest.resources[3].identity(), "settings");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = "- type: vlan\n  vlan_id: 10\n  colour: blue\n";
        assert!(Manifest::from_yaml(text).is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let text = "- type: bgp\n  name: \"65000\"\n";
        assert!(Manifest::from_yaml(text).is_err());
    }

    #[test]
    fn test_report_counts() {
        let outcome = |status| Outcome {
            resource_type: "vlan".into(),
            name: "10".into(),
            status,
            changed: Vec::new(),
            error: None,
        };
        let report = Report {
            outcomes: vec![outcome(Status::Ok), outcome(Status::Changed), outcome(Status::Failed)],
        };
        assert_eq!((report.ok(), report.changed(), report.failed()), (1, 1, 1));
        assert!(report.has_failures());
    }
}
