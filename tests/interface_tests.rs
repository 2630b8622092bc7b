//! Interface convergence against scripted and simulated switches.

mod common;

use common::*;
use eosible::error::Error;
use eosible::modules::{interface, ipinterface};
use eosible::providers::{Ensure, InterfaceProvider, InterfaceResource};
use eosible::reconcile::{self, converge, Manifest, Status};
use pretty_assertions::assert_eq;
use serde_json::json;

const ETHERNET1: &str = "interface Ethernet1\n  description test interface\n  no shutdown\n!\n";

fn description(name: &str, text: &str) -> InterfaceResource {
    InterfaceResource {
        name: name.to_string(),
        ensure: Ensure::Present,
        description: Some(text.to_string()),
        shutdown: None,
        speed: None,
        lacp_priority: None,
    }
}

#[test]
fn test_parse_ethernet1() {
    let node = ScriptedEapi::new().with_running_config(ETHERNET1).node();
    let ethernet1 = interface::get(&node, "Ethernet1").unwrap().unwrap();
    assert_eq!(ethernet1.name, "Ethernet1");
    assert_eq!(ethernet1.description, "test interface");
    assert!(!ethernet1.shutdown);
    assert_eq!(ethernet1.speed.as_deref(), Some(interface::DEFAULT_SPEED));
}

#[test]
fn test_description_change_sends_two_commands() {
    let eapi = ScriptedEapi::new().with_running_config(ETHERNET1);
    let node = eapi.node();

    let changed = converge::<InterfaceProvider>(&node, &description("Ethernet1", "foo")).unwrap();

    assert_eq!(changed, vec!["description"]);
    assert_eq!(
        eapi.batches(),
        vec![vec!["interface Ethernet1".to_string(), "description foo".to_string()]]
    );
}

#[test]
fn test_description_change_requires_every_ack() {
    let eapi = ScriptedEapi::new().with_running_config(ETHERNET1);
    eapi.queue_config_reply(vec![json!({})]);
    let node = eapi.node();

    let err = converge::<InterfaceProvider>(&node, &description("Ethernet1", "foo")).unwrap_err();
    match err {
        Error::NotAcknowledged { commands, replies } => {
            assert_eq!(commands, vec!["interface Ethernet1", "description foo"]);
            assert_eq!(replies, 1);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_non_empty_ack_is_rejected() {
    let eapi = ScriptedEapi::new().with_running_config(ETHERNET1);
    eapi.queue_config_reply(vec![json!({}), json!({"messages": ["% Invalid input"]})]);
    let node = eapi.node();

    let err = converge::<InterfaceProvider>(&node, &description("Ethernet1", "foo")).unwrap_err();
    assert!(matches!(err, Error::NotAcknowledged { .. }));
}

#[test]
fn test_unchanged_interface_sends_nothing() {
    let eapi = ScriptedEapi::new().with_running_config(ETHERNET1);
    let node = eapi.node();

    let changed =
        converge::<InterfaceProvider>(&node, &description("Ethernet1", "test interface")).unwrap();
    assert!(changed.is_empty());
    assert!(eapi.batches().is_empty());
}

#[test]
fn test_round_trip_on_simulated_switch() {
    let switch = SimulatedSwitch::from_config(LEAF_CONFIG);
    let manifest = Manifest::from_yaml(
        r#"
- type: interface
  name: Ethernet2
  description: to spine01
  shutdown: false
- type: interface
  name: Loopback1
  description: vtep
- type: interface
  name: Loopback0
  ensure: absent
"#,
    )
    .unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(report.changed(), 3);
    assert_eq!(report.outcomes[0].changed, vec!["description", "shutdown"]);
    assert_eq!(report.outcomes[1].changed, vec!["ensure", "description"]);
    assert_eq!(report.outcomes[2].changed, vec!["ensure"]);

    let interfaces = interface::getall(&switch.node()).unwrap();
    assert_eq!(interfaces["Ethernet2"].description, "to spine01");
    assert!(!interfaces["Ethernet2"].shutdown);
    assert_eq!(interfaces["Loopback1"].description, "vtep");
    assert!(!interfaces.contains_key("Loopback0"));

    // A second run finds nothing to do.
    let again = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(again.ok(), 3);
    assert_eq!(again.changed(), 0);
}

#[test]
fn test_physical_interface_cannot_be_created() {
    let switch = SimulatedSwitch::from_config(LEAF_CONFIG);
    let manifest = Manifest::from_yaml(
        r#"
- type: interface
  name: Ethernet9
  description: missing port
- type: interface
  name: Ethernet1
  description: still converged
"#,
    )
    .unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(report.outcomes[0].status, Status::Failed);
    assert!(report.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("physical interfaces cannot be created"));
    assert_eq!(report.outcomes[1].status, Status::Changed);
    assert!(report.has_failures());
}

#[test]
fn test_device_rejection_is_isolated() {
    let switch = SimulatedSwitch::from_config(LEAF_CONFIG).rejecting("description bad");
    let manifest = Manifest::from_yaml(
        r#"
- type: interface
  name: Ethernet1
  description: bad
- type: interface
  name: Ethernet2
  shutdown: false
"#,
    )
    .unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(report.outcomes[0].status, Status::Failed);
    assert_eq!(report.outcomes[1].status, Status::Changed);
    assert!(!interface::get(&switch.node(), "Ethernet2").unwrap().unwrap().shutdown);
}

#[test]
fn test_transport_failure_aborts_run() {
    // No running-config is scripted, so the first read fails.
    let node = ScriptedEapi::new().node();
    let manifest = Manifest::from_yaml("- type: interface\n  name: Ethernet1\n").unwrap();

    let err = reconcile::apply(&node, &manifest).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

// ============================================================================
// Routed interfaces
// ============================================================================

const ROUTED_CONFIG: &str = "\
interface Ethernet1
   no shutdown
   switchport
!
interface Ethernet2
   no shutdown
   no switchport
   ip address 10.0.0.1/31
   mtu 9000
   ip helper-address 10.10.10.1
!
";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_ipinterface_created_from_switchport() {
    let switch = SimulatedSwitch::from_config(ROUTED_CONFIG);
    let manifest = Manifest::from_yaml(
        r#"
- type: ipinterface
  name: Ethernet1
  address: 10.1.1.1/24
  mtu: 9000
  helper_addresses: [10.0.0.5]
"#,
    )
    .unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(
        report.outcomes[0].changed,
        vec!["ensure", "address", "mtu", "helper_addresses"]
    );
    assert_eq!(
        switch.batches(),
        vec![
            strings(&["interface Ethernet1", "no switchport"]),
            strings(&["interface Ethernet1", "ip address 10.1.1.1/24"]),
            strings(&["interface Ethernet1", "mtu 9000"]),
            strings(&[
                "interface Ethernet1",
                "no ip helper-address",
                "ip helper-address 10.0.0.5",
            ]),
        ]
    );

    let routed = ipinterface::getall(&switch.node()).unwrap();
    assert_eq!(routed["Ethernet1"].address, "10.1.1.1/24");
    assert_eq!(routed["Ethernet1"].mtu, Some(9000));
    assert_eq!(routed["Ethernet1"].helper_addresses, strings(&["10.0.0.5"]));

    let again = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(again.outcomes[0].status, Status::Ok);
}

#[test]
fn test_ipinterface_helpers_replaced_and_address_cleared() {
    let switch = SimulatedSwitch::from_config(ROUTED_CONFIG);
    let manifest = Manifest::from_yaml(
        r#"
- type: ipinterface
  name: Ethernet2
  address: ""
  mtu: 9000
  helper_addresses: [10.10.10.2, 10.10.10.3]
"#,
    )
    .unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(report.outcomes[0].changed, vec!["address", "helper_addresses"]);
    assert_eq!(
        switch.commands(),
        strings(&[
            "interface Ethernet2",
            "no ip address",
            "interface Ethernet2",
            "no ip helper-address",
            "ip helper-address 10.10.10.2",
            "ip helper-address 10.10.10.3",
        ])
    );

    let ethernet2 = &ipinterface::getall(&switch.node()).unwrap()["Ethernet2"];
    assert_eq!(ethernet2.address, "");
    assert_eq!(ethernet2.helper_addresses, strings(&["10.10.10.2", "10.10.10.3"]));
}

#[test]
fn test_ipinterface_removed_returns_to_switchport() {
    let switch = SimulatedSwitch::from_config(ROUTED_CONFIG);
    let manifest =
        Manifest::from_yaml("- type: ipinterface\n  name: Ethernet2\n  ensure: absent\n").unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(report.outcomes[0].changed, vec!["ensure"]);
    assert_eq!(
        switch.commands(),
        strings(&["interface Ethernet2", "no ip address", "switchport"])
    );
    assert!(!ipinterface::getall(&switch.node())
        .unwrap()
        .contains_key("Ethernet2"));
}

#[test]
fn test_ipinterface_invalid_values_fail_before_writing() {
    let switch = SimulatedSwitch::from_config(ROUTED_CONFIG);
    let manifest = Manifest::from_yaml(
        r#"
- type: ipinterface
  name: Ethernet2
  address: 10.1.1.1
- type: ipinterface
  name: Ethernet1
  mtu: 20
"#,
    )
    .unwrap();

    let report = reconcile::apply(&switch.node(), &manifest).unwrap();
    assert_eq!(report.outcomes[0].status, Status::Failed);
    assert_eq!(report.outcomes[1].status, Status::Failed);
    assert!(report.outcomes[1].error.as_deref().unwrap().contains("mtu 20"));
    assert!(switch.batches().is_empty());
}
