//! # FV-01 Vault Ledger
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (domain / ports / adapters)
//!
//! ## Purpose
//!
//! Authoritative record of what a fund custodies:
//!
//! - **Asset balances** live in an [`AssetBook`] shared by every account
//!   (vaults, adapters, external protocols).
//! - **Tracked assets** (the set counted toward valuation) live in the
//!   fund-scoped [`VaultLedger`].
//! - **Staged mutation**: pipelines write through a [`StagedBook`] overlay
//!   that is either committed as a whole or dropped.
//! - **Scoped access**: untrusted code acts through an [`AccountScope`]
//!   bound to one account; it can never debit a vault without an
//!   allowance.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Denomination asset always tracked | `VaultLedger::remove_tracked_asset` |
//! | Tracked set bounded | `VaultLedger::add_tracked_asset` |
//! | Manual removal only at or below dust | `VaultLedger::remove_tracked_asset_checked` |
//! | Commit is all-or-nothing | `AssetBook::apply` validates before writing |
//! | Only issuers mint, vault debits need an allowance | `AccountScope` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Price oracle | `ValueInterpreter` | Dust tolerance in a reference asset |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 1;
