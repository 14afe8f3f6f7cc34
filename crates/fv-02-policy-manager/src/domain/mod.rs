//! # Domain Layer
//!
//! Policy settings, the policy registry and the per-fund enabled set.

pub mod config;
pub mod errors;
pub mod fund_policies;
pub mod registry;

pub use config::*;
pub use errors::*;
pub use fund_policies::*;
pub use registry::*;
