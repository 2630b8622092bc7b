//! Show command - print the parsed state of one resource family

use super::CommandContext;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use eosible::eapi::Node;
use eosible::modules::{
    interface, ipinterface, logging, mlag, ntp, ospf, prefixlist, routemap, staticroute, stp,
    switchport, vlan, vxlan,
};
use serde_json::{json, Value};

/// Resource families that can be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    Interfaces,
    IpInterfaces,
    Switchports,
    Vlans,
    Ospf,
    OspfInterfaces,
    OspfNetworks,
    RouteMaps,
    PrefixLists,
    StaticRoutes,
    Vxlan,
    Stp,
    MstInstances,
    StpInterfaces,
    Mlag,
    Ntp,
    Logging,
}

impl Family {
    /// Reads every record of this family from the device.
    pub fn collect(self, node: &Node) -> eosible::error::Result<Value> {
        Ok(match self {
            Family::Interfaces => serde_json::to_value(interface::getall(node)?)?,
            Family::IpInterfaces => serde_json::to_value(ipinterface::getall(node)?)?,
            Family::Switchports => serde_json::to_value(switchport::getall(node)?)?,
            Family::Vlans => serde_json::to_value(vlan::getall(node)?)?,
            Family::Ospf => serde_json::to_value(ospf::getall(node)?)?,
            Family::OspfInterfaces => serde_json::to_value(ospf::interfaces(node)?)?,
            Family::OspfNetworks => serde_json::to_value(ospf::networks(node)?)?,
            Family::RouteMaps => serde_json::to_value(routemap::getall(node)?)?,
            Family::PrefixLists => serde_json::to_value(prefixlist::getall(node)?)?,
            Family::StaticRoutes => serde_json::to_value(staticroute::getall(node)?)?,
            Family::Vxlan => serde_json::to_value(vxlan::get(node)?)?,
            Family::Stp => json!({ "mode": stp::get_mode(node)? }),
            Family::MstInstances => serde_json::to_value(stp::mst_instances(node)?)?,
            Family::StpInterfaces => serde_json::to_value(stp::interfaces(node)?)?,
            Family::Mlag => serde_json::to_value(mlag::getall(node)?)?,
            Family::Ntp => serde_json::to_value(ntp::get(node)?)?,
            Family::Logging => serde_json::to_value(logging::getall(node)?)?,
        })
    }
}

/// Arguments for the show command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Resource family to read
    #[arg(value_enum)]
    pub family: Family,
}

impl ShowArgs {
    /// Execute the show command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let node = Node::new(ctx.client()?);
        let state = self.family.collect(&node)?;

        if let Some(name) = self.family.to_possible_value() {
            ctx.output.section(&name.get_name().to_uppercase());
        }
        ctx.output.document(&state)?;
        Ok(0)
    }
}
