//! # Adapters Layer
//!
//! - In-memory registries for adapters and funds
//! - The per-fund in-flight guard
//! - Event sinks
//! - Reference integrations against mock external protocols

pub mod adapter_registry;
pub mod event_log;
pub mod fund_registry;
pub mod in_flight;
pub mod integrations;

pub use adapter_registry::*;
pub use event_log::*;
pub use fund_registry::*;
pub use in_flight::*;
