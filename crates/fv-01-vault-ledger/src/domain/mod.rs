//! # Domain Layer
//!
//! Fund-scoped ledger state and the rules that guard it.
//! No locking and no I/O in here.

pub mod dust;
pub mod errors;
pub mod tracked;
pub mod vault;

pub use dust::*;
pub use errors::*;
pub use tracked::*;
pub use vault::*;
