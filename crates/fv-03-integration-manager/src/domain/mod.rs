//! # Domain Layer
//!
//! Call-scoped values (asset plans, snapshots, receipts) and the
//! fund-scoped [`Fund`] entity.

pub mod asset_plan;
pub mod fund;
pub mod receipt;
pub mod reconcile;

pub use asset_plan::*;
pub use fund::*;
pub use receipt::*;
pub use reconcile::*;
