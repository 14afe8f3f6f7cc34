//! # Ports Layer
//!
//! - **Driven Ports**: `AssetReader` / `AssetTransfer` (token substrate),
//!   `ValueInterpreter` (valuation collaborator).

pub mod outbound;

pub use outbound::*;
