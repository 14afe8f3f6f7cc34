//! # Shared Types Crate
//!
//! Value objects shared by the vault ledger, the policy manager and the
//! integration manager.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every identifier that crosses a crate
//!   boundary (`Address`, `FundId`, `Selector`, ...) is defined here.
//! - **Opaque payloads**: adapter arguments travel as [`Bytes`]; only the
//!   adapter that owns a selector knows how to decode them ([`codec`]).
//! - **Hook vocabulary**: [`HookKind`], [`Timing`] and [`HookContext`] are
//!   the contract between hook callers and policies.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod hooks;

pub use codec::{decode_args, encode_args};
pub use entities::*;
pub use errors::*;
pub use hooks::*;
