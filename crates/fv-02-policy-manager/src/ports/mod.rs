//! # Ports Layer
//!
//! - **Driven Ports**: `Policy` (rule plugins) and the `RuleContext` they
//!   read fund state through.

pub mod outbound;

pub use outbound::*;
