//! # eosible - declarative configuration for Arista EOS
//!
//! eosible converges Arista EOS switches towards a declared state. For each
//! resource family (interfaces, switchports, VLANs, OSPF, route-maps,
//! prefix-lists, static routes, VXLAN, spanning-tree, MLAG, NTP and syslog
//! hosts) it reads the current state from the device, diffs it against the
//! desired record and issues the minimal configuration-mode commands to close
//! the gap.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Manifest + reconciler                          │
//! │            (YAML resource records, per-resource outcomes)            │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Providers                                  │
//! │     (instances / create / destroy / sync / flush per family)         │
//! └─────────────────────────────────────────────────────────────────────┘
//!                    │                                 │
//!                    ▼                                 ▼
//! ┌───────────────────────────────┐   ┌─────────────────────────────────┐
//! │   Parsers (modules::<family>) │   │  Builders (modules::<family>)   │
//! │  running-config + JSON replies│   │  Intent -> command lines        │
//! └───────────────────────────────┘   └─────────────────────────────────┘
//!                    │                                 │
//!                    └────────────────┬────────────────┘
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Node (snapshot cache + ack check)                 │
//! │                 over the Eapi trait (HTTP client, dry run)           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use eosible::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config::load(None).map_err(|e| Error::Config(e.to_string()))?;
//!     let node = Node::new(EapiClient::new(&config.connection)?);
//!
//!     let manifest = Manifest::load("site.yml".as_ref())?;
//!     let report = reconcile::apply(&node, &manifest)?;
//!     println!("{} changed, {} failed", report.changed(), report.failed());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod eapi;
pub mod error;
pub mod modules;
pub mod providers;
pub mod reconcile;
pub mod running_config;
pub mod telemetry;

/// Convenient re-exports of commonly used types and traits.
pub mod prelude {
    pub use crate::config::{Config, ConnectionConfig, Transport};
    pub use crate::eapi::{DryRun, Eapi, EapiClient, Format, Journal, Node};
    pub use crate::error::{Error, Result};
    pub use crate::modules::{Action, Intent};
    pub use crate::providers::{Desired, Ensure, Provider};
    pub use crate::reconcile::{self, Manifest, Outcome, Report, Resource, Status};
    pub use crate::running_config::RunningConfig;
    pub use crate::telemetry::{LogFormat, LogLevel, LoggingBuilder};
}

/// Crate version, from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
