//! # Ports Layer
//!
//! - **Driven Ports**: `Adapter` (external protocol plugins), `EventSink`
//!   (event publication).

pub mod outbound;

pub use outbound::*;
