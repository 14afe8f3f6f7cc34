//! # FV-02 Policy Manager
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (domain / ports / adapters / service)
//!
//! ## Purpose
//!
//! Keeps the per-fund set of enabled policies and evaluates them when a
//! hook fires. A policy is a plugin implementing [`Policy`]: it declares
//! the `(HookKind, Timing)` pairs it handles and answers a boolean rule.
//!
//! ## Evaluation Order
//!
//! Policies of a fund are evaluated in the order they were enabled for
//! that fund. The first rule that evaluates to `false` stops evaluation
//! and names the policy in [`PolicyError::RuleFailed`].
//!
//! ## Built-in Policies
//!
//! | Identifier | Hooks | Updatable | Can disable |
//! |------------|-------|-----------|-------------|
//! | `ASSET_BLACKLIST` | PostCallOnIntegration, PostAddTrackedAssets | no | no |
//! | `ASSET_WHITELIST` | PostCallOnIntegration, PostAddTrackedAssets | no | no |
//! | `ADAPTER_BLACKLIST` | PreCallOnIntegration | no | no |
//! | `ADAPTER_WHITELIST` | PreCallOnIntegration | no | no |
//! | `INVESTOR_WHITELIST` | PreBuyShares | yes | yes |
//! | `BUY_SHARES_CALLER_WHITELIST` | PreBuyShares | no | yes |
//! | `MIN_MAX_INVESTMENT` | PostBuyShares | yes | yes |
//! | `MAX_CONCENTRATION` | PostCallOnIntegration | yes | no |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::PolicyManager;

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 2;
