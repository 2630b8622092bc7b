//! Observability for eosible.
//!
//! eosible instruments itself with `tracing` events; this module only decides
//! where they go.

pub mod logging;

pub use logging::{LogFormat, LogLevel, LoggingBuilder, LoggingConfig};
