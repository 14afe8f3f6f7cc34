//! # Adapters Layer
//!
//! In-memory implementations of the ledger ports.

pub mod account_scope;
pub mod asset_book;
pub mod staged_book;
pub mod valuation;

pub use account_scope::*;
pub use asset_book::*;
pub use staged_book::*;
pub use valuation::*;
