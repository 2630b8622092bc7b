//! Shared test utilities for the eosible integration tests.
//!
//! This module provides:
//! - `ScriptedEapi`: canned replies per show command, scripted
//!   configuration replies and a log of every batch
//! - `SimulatedSwitch`: a small model of an EOS running configuration that
//!   applies configuration commands the way the CLI would
//! - manifest and running-config fixtures
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use eosible::eapi::node::RUNNING_CONFIG_COMMAND;
use eosible::eapi::{Eapi, Format, Node};
use eosible::error::{Error, Result};
use serde_json::{json, Value};

/// One empty acknowledgement per command.
pub fn acks(count: usize) -> Vec<Value> {
    (0..count).map(|_| json!({})).collect()
}

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Debug, Default)]
struct Script {
    json: HashMap<String, Value>,
    text: HashMap<String, String>,
    config_replies: VecDeque<Vec<Value>>,
    batches: Vec<Vec<String>>,
    reads: Vec<String>,
}

/// A transport that answers from a script. Clones share the script, so a
/// test can keep a handle after moving one into a [`Node`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedEapi {
    script: Rc<RefCell<Script>>,
}

impl ScriptedEapi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `text` as the running configuration.
    pub fn with_running_config(self, text: &str) -> Self {
        self.with_text(RUNNING_CONFIG_COMMAND, text)
    }

    pub fn with_text(self, command: &str, text: &str) -> Self {
        self.script
            .borrow_mut()
            .text
            .insert(command.to_string(), text.to_string());
        self
    }

    pub fn with_json(self, command: &str, reply: Value) -> Self {
        self.script
            .borrow_mut()
            .json
            .insert(command.to_string(), reply);
        self
    }

    /// Replies to the next configuration batch with `replies` instead of one
    /// acknowledgement per command.
    pub fn queue_config_reply(&self, replies: Vec<Value>) {
        self.script.borrow_mut().config_replies.push_back(replies);
    }

    pub fn node(&self) -> Node {
        Node::new(self.clone())
    }

    /// Every configuration batch, in issue order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.script.borrow().batches.clone()
    }

    /// Every configuration command, flattened.
    pub fn commands(&self) -> Vec<String> {
        self.script.borrow().batches.concat()
    }

    /// Every show command issued.
    pub fn reads(&self) -> Vec<String> {
        self.script.borrow().reads.clone()
    }
}

impl Eapi for ScriptedEapi {
    fn enable(&self, commands: &[String], format: Format) -> Result<Vec<Value>> {
        let mut script = self.script.borrow_mut();
        let mut replies = Vec::with_capacity(commands.len());
        for command in commands {
            script.reads.push(command.clone());
            let reply = match format {
                Format::Json => script.json.get(command).cloned(),
                Format::Text => script.text.get(command).map(|text| json!({ "output": text })),
            };
            replies.push(
                reply.ok_or_else(|| Error::transport(format!("no scripted reply for '{}'", command)))?,
            );
        }
        Ok(replies)
    }

    fn config(&self, commands: &[String]) -> Result<Vec<Value>> {
        let mut script = self.script.borrow_mut();
        script.batches.push(commands.to_vec());
        Ok(script
            .config_replies
            .pop_front()
            .unwrap_or_else(|| acks(commands.len())))
    }
}

// ============================================================================
// Simulated switch
// ============================================================================

/// Headers that enter a configuration mode.
const CONTEXTS: &[&str] = &[
    "interface ",
    "route-map ",
    "router ospf ",
    "vlan ",
    "spanning-tree mst configuration",
];

/// Global commands that never enter a mode.
const GLOBALS: &[&str] = &[
    "ip prefix-list ",
    "logging host ",
    "ip route ",
    "ntp source",
    "spanning-tree mode",
    "spanning-tree mst ",
];

/// Globals that hold a single value.
const SINGLE_GLOBALS: &[&str] = &["ntp source", "spanning-tree mode"];

/// Globals whose last word is the value, keyed by the rest of the line.
const KEYED_GLOBALS: &[&str] = &["spanning-tree mst "];

/// Boolean lines that `show running-config all` renders as `X` or `no X`.
const TOGGLES: &[&str] = &["shutdown", "passive-interface default", "switchport"];

/// Mode commands that hold a single value.
const SINGLE: &[&str] = &[
    "description",
    "continue",
    "speed",
    "lacp port-priority",
    "router-id",
    "max-lsa",
    "maximum-paths",
    "name",
    "state",
    "mlag",
    "ip ospf network",
    "ip address",
    "mtu",
    "switchport mode",
    "switchport access vlan",
    "switchport trunk native vlan",
    "switchport trunk allowed vlan",
    "vxlan source-interface",
    "vxlan multicast-group",
    "vxlan udp-port",
];

#[derive(Debug, Clone, PartialEq)]
enum Section {
    Line(String),
    Block { header: String, children: Vec<String> },
}

#[derive(Debug, Default)]
struct Device {
    sections: Vec<Section>,
    json: HashMap<String, Value>,
    text: HashMap<String, String>,
    batches: Vec<Vec<String>>,
    reject: Option<String>,
}

fn is_context(line: &str) -> bool {
    CONTEXTS.iter().any(|prefix| line.starts_with(prefix))
}

fn is_global(line: &str) -> bool {
    GLOBALS.iter().any(|prefix| line.starts_with(prefix))
}

/// Route-map entries are identified by name and sequence number only, so
/// re-entering with a new action replaces the old one.
fn block_key(header: &str) -> String {
    let words: Vec<&str> = header.split_whitespace().collect();
    match words.as_slice() {
        ["route-map", name, _action, seqno] => format!("route-map {} {}", name, seqno),
        _ => header.to_string(),
    }
}

fn render_block(out: &mut String, header: &str, children: &[String]) {
    out.push_str(header);
    out.push('\n');
    for child in children {
        out.push_str("   ");
        out.push_str(child);
        out.push('\n');
    }
    out.push_str("!\n");
}

impl Device {
    fn parse(text: &str) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == "!" {
                if let Some((header, children)) = current.take() {
                    sections.push(Section::Block { header, children });
                }
                continue;
            }
            if line.starts_with(char::is_whitespace) {
                if let Some((_, children)) = current.as_mut() {
                    children.push(trimmed.to_string());
                }
                continue;
            }
            if let Some((header, children)) = current.take() {
                sections.push(Section::Block { header, children });
            }
            if is_context(trimmed) {
                current = Some((trimmed.to_string(), Vec::new()));
            } else {
                sections.push(Section::Line(trimmed.to_string()));
            }
        }
        if let Some((header, children)) = current {
            sections.push(Section::Block { header, children });
        }
        sections
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match section {
                Section::Line(line) => {
                    out.push_str(line);
                    out.push_str("\n!\n");
                }
                Section::Block { header, children } => render_block(&mut out, header, children),
            }
        }
        out
    }

    fn children(&self, header: &str) -> Option<&[String]> {
        self.sections.iter().find_map(|section| match section {
            Section::Block { header: h, children } if h == header => Some(children.as_slice()),
            _ => None,
        })
    }

    /// `show running-config all interfaces <name>`: the block alone, or
    /// nothing when the interface does not exist.
    fn render_interface(&self, name: &str) -> String {
        let header = format!("interface {}", name);
        let mut out = String::new();
        if let Some(children) = self.children(&header) {
            render_block(&mut out, &header, children);
        }
        out
    }

    /// `show running-config section <prefix>` over global lines.
    fn render_section(&self, prefix: &str) -> String {
        self.sections
            .iter()
            .filter_map(|section| match section {
                Section::Line(line) if line.starts_with(prefix) => Some(format!("{}\n", line)),
                _ => None,
            })
            .collect()
    }

    /// Interfaces with a bare `switchport` line forward as layer 2 ports.
    fn interfaces_json(&self) -> Value {
        let mut interfaces = serde_json::Map::new();
        for section in &self.sections {
            if let Section::Block { header, children } = section {
                if let Some(name) = header.strip_prefix("interface ") {
                    let model = if children.iter().any(|c| c == "switchport") {
                        "bridged"
                    } else {
                        "routed"
                    };
                    interfaces.insert(name.to_string(), json!({ "forwardingModel": model }));
                }
            }
        }
        json!({ "interfaces": interfaces })
    }

    /// `show interfaces <name> switchport`, derived from the port's block.
    fn switchport_status(&self, name: &str) -> String {
        let children = self
            .children(&format!("interface {}", name))
            .unwrap_or_default();
        let value = |prefix: &str| {
            children
                .iter()
                .find_map(|c| c.strip_prefix(prefix))
                .unwrap_or("1")
                .to_string()
        };
        let mode = if children.iter().any(|c| c == "switchport mode trunk") {
            "trunk"
        } else {
            "static access"
        };
        format!(
            "Name: {}\nSwitchport: Enabled\nAdministrative Mode: {mode}\nOperational Mode: {mode}\n\
             Access Mode VLAN: {}\nTrunking Native Mode VLAN: {}\n",
            name,
            value("switchport access vlan "),
            value("switchport trunk native vlan "),
            mode = mode,
        )
    }

    fn text_reply(&self, command: &str) -> Option<String> {
        if let Some(text) = self.text.get(command) {
            return Some(text.clone());
        }
        if command == RUNNING_CONFIG_COMMAND {
            return Some(self.render());
        }
        if let Some(name) = command.strip_prefix("show running-config all interfaces ") {
            return Some(self.render_interface(name));
        }
        if let Some(prefix) = command.strip_prefix("show running-config section ") {
            return Some(self.render_section(prefix));
        }
        command
            .strip_prefix("show interfaces ")
            .and_then(|rest| rest.strip_suffix(" switchport"))
            .map(|name| self.switchport_status(name))
    }

    fn json_reply(&self, command: &str) -> Option<Value> {
        match self.json.get(command) {
            Some(reply) => Some(reply.clone()),
            None if command == "show interfaces" => Some(self.interfaces_json()),
            None => None,
        }
    }

    fn block_index(&self, header: &str) -> Option<usize> {
        let key = block_key(header);
        self.sections.iter().position(|section| match section {
            Section::Block { header, .. } => block_key(header) == key,
            Section::Line(_) => false,
        })
    }

    fn enter(&mut self, header: &str) -> usize {
        if let Some(index) = self.block_index(header) {
            if let Section::Block { header: current, .. } = &mut self.sections[index] {
                *current = header.to_string();
            }
            return index;
        }
        let children = if header.starts_with("interface ") {
            vec!["no shutdown".to_string()]
        } else {
            Vec::new()
        };
        self.sections.push(Section::Block {
            header: header.to_string(),
            children,
        });
        self.sections.len() - 1
    }

    fn remove_block(&mut self, header: &str) {
        let key = block_key(header);
        self.sections.retain(|section| match section {
            Section::Block { header, .. } => block_key(header) != key,
            Section::Line(_) => true,
        });
    }

    fn remove_global(&mut self, line: &str) {
        let prefix = format!("{} ", line);
        self.sections.retain(|section| match section {
            Section::Line(existing) => existing != line && !existing.starts_with(&prefix),
            Section::Block { .. } => true,
        });
    }

    fn set_global(&mut self, line: &str) {
        if let Some(key) = SINGLE_GLOBALS.iter().find(|key| line.starts_with(*key)) {
            self.sections
                .retain(|section| !matches!(section, Section::Line(l) if l.starts_with(key)));
        }
        if KEYED_GLOBALS.iter().any(|prefix| line.starts_with(prefix)) {
            if let Some((key, _)) = line.rsplit_once(' ') {
                let prefix = format!("{} ", key);
                self.sections
                    .retain(|section| !matches!(section, Section::Line(l) if l.starts_with(&prefix)));
            }
        }
        let present = self
            .sections
            .iter()
            .any(|section| matches!(section, Section::Line(l) if l == line));
        if !present {
            self.sections.push(Section::Line(line.to_string()));
        }
    }

    fn apply_child(&mut self, index: usize, command: &str) {
        let Section::Block { children, .. } = &mut self.sections[index] else {
            return;
        };

        // Under passive-interface default, the negated form is the exception
        // itself and stays in the configuration.
        if let Some(name) = command.strip_prefix("no passive-interface ") {
            if name != "default" {
                children.retain(|c| c != &format!("passive-interface {}", name));
                children.push(command.to_string());
                return;
            }
        }

        let negated = command
            .strip_prefix("no ")
            .or_else(|| command.strip_prefix("default "));
        if let Some(rest) = negated {
            if TOGGLES.contains(&rest) {
                children.retain(|c| c != rest && c != &format!("no {}", rest));
                children.push(format!("no {}", rest));
                return;
            }
            let prefix = format!("{} ", rest);
            children.retain(|c| {
                c != rest && !c.starts_with(&prefix) && c.strip_prefix("no ") != Some(rest)
            });
            return;
        }

        if TOGGLES.contains(&command) {
            children.retain(|c| c != command && c != &format!("no {}", command));
            children.push(command.to_string());
            return;
        }
        if let Some(key) = SINGLE.iter().find(|key| command.starts_with(&format!("{} ", key))) {
            let prefix = format!("{} ", key);
            children.retain(|c| !c.starts_with(&prefix));
        }
        if !children.iter().any(|c| c == command) {
            children.push(command.to_string());
        }
    }

    fn apply(&mut self, commands: &[String]) {
        let mut context: Option<usize> = None;

        for command in commands {
            let command = command.trim();
            if command == "exit" || command == "end" {
                context = None;
                continue;
            }

            if let Some(rest) = command.strip_prefix("no ") {
                if is_context(rest) && !rest.starts_with("spanning-tree") {
                    self.remove_block(rest);
                    context = None;
                    continue;
                }
                if is_global(rest) {
                    self.remove_global(rest);
                    context = None;
                    continue;
                }
            } else if let Some(rest) = command.strip_prefix("default ") {
                if is_context(rest) {
                    let index = self.enter(rest);
                    if let Section::Block { children, .. } = &mut self.sections[index] {
                        children.retain(|c| c == "no shutdown");
                    }
                    context = None;
                    continue;
                }
            } else if is_context(command) {
                context = Some(self.enter(command));
                continue;
            } else if is_global(command) {
                self.set_global(command);
                context = None;
                continue;
            }

            match context {
                Some(index) => self.apply_child(index, command),
                None => self.set_global(command),
            }
        }
    }
}

/// An in-memory EOS node. Show commands read the modeled configuration;
/// configuration batches are applied to it and acknowledged.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSwitch {
    device: Rc<RefCell<Device>>,
}

impl SimulatedSwitch {
    /// A switch whose running configuration is `text`.
    pub fn from_config(text: &str) -> Self {
        let switch = Self::default();
        switch.device.borrow_mut().sections = Device::parse(text);
        switch
    }

    pub fn with_json(self, command: &str, reply: Value) -> Self {
        self.device
            .borrow_mut()
            .json
            .insert(command.to_string(), reply);
        self
    }

    /// Serves `text` for `command`, ahead of anything derived from the
    /// modeled configuration.
    pub fn with_text(self, command: &str, text: &str) -> Self {
        self.device
            .borrow_mut()
            .text
            .insert(command.to_string(), text.to_string());
        self
    }

    /// Fails any batch containing `command` with a device error.
    pub fn rejecting(self, command: &str) -> Self {
        self.device.borrow_mut().reject = Some(command.to_string());
        self
    }

    pub fn node(&self) -> Node {
        Node::new(self.clone())
    }

    /// The current running configuration.
    pub fn running_config(&self) -> String {
        self.device.borrow().render()
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.device.borrow().batches.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.device.borrow().batches.concat()
    }
}

impl Eapi for SimulatedSwitch {
    fn enable(&self, commands: &[String], format: Format) -> Result<Vec<Value>> {
        let device = self.device.borrow();
        commands
            .iter()
            .map(|command| {
                let reply = match format {
                    Format::Text => device.text_reply(command).map(|text| json!({ "output": text })),
                    Format::Json => device.json_reply(command),
                };
                reply.ok_or_else(|| Error::transport(format!("unsupported command '{}'", command)))
            })
            .collect()
    }

    fn config(&self, commands: &[String]) -> Result<Vec<Value>> {
        let mut device = self.device.borrow_mut();
        if let Some(rejected) = device.reject.clone() {
            if commands.iter().any(|c| c == &rejected) {
                return Err(Error::Eapi {
                    code: 1002,
                    message: format!("CLI command 2 of {} failed: invalid command", commands.len()),
                    errors: vec![format!("Invalid input (at token 0: '{}')", rejected)],
                });
            }
        }
        device.batches.push(commands.to_vec());
        device.apply(commands);
        Ok(acks(commands.len()))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A small leaf switch configuration.
pub const LEAF_CONFIG: &str = "\
hostname leaf01
!
logging host 10.0.0.50
!
ip prefix-list MYLIST seq 10 permit 10.0.0.0/24
!
ip prefix-list MYLIST seq 20 deny 10.1.0.0/16 ge 24 le 28
!
interface Ethernet1
   description test interface
   no shutdown
!
interface Ethernet2
   shutdown
!
interface Loopback0
   description router id
   no shutdown
!
route-map TEST permit 10
   description first rule
   match ip address prefix-list MYLIST
   match tag 100
   set local-preference 200
!
route-map TEST deny 20
!
";
