//! # FV-03 Integration Manager
//!
//! **Subsystem ID:** 3  
//! **Architecture:** Hexagonal (domain / ports / adapters / service)
//!
//! ## Purpose
//!
//! Lets a fund run arbitrary external-protocol actions through pluggable
//! [`Adapter`]s while guaranteeing that the vault never loses more than
//! the adapter declared, that every declared incoming asset arrives, and
//! that the fund's policies can veto the call before or after it runs.
//!
//! ## Pipeline
//!
//! | Step | On failure |
//! |------|------------|
//! | fund guard, caller rights | `Reentrancy`, `Unauthorized` |
//! | resolve adapter, parse and validate the [`AssetPlan`] | `Validation` |
//! | pre-hook with declared amounts | `PolicyRejection` |
//! | move spend assets (Transfer / Approve) | `Validation` |
//! | `Adapter::execute`, acting as the adapter's own account | `ExternalCallFailure` |
//! | sweep adapter residuals, revoke allowances, reconcile | `CustodyViolation` |
//! | tracked set update | `Validation` |
//! | post-hook with actual amounts | `PolicyRejection` |
//! | commit | `CustodyViolation` |
//!
//! All movements are staged; an error at any step leaves balances,
//! allowances and tracked assets exactly as they were.
//!
//! ## Concurrency
//!
//! One operation per fund at a time. A second operation on a busy fund,
//! including a re-entrant call from adapter code, fails with
//! [`IntegrationError::Reentrancy`]. Distinct funds run in parallel.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use config::IntegrationConfig;
pub use domain::*;
pub use errors::{ErrorKind, IntegrationError};
pub use events::IntegrationEvent;
pub use ports::*;
pub use service::{IntegrationManager, ServiceStats};

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 3;
