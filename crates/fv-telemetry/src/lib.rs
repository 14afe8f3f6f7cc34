//! # FV Telemetry
//!
//! Structured logging for the fund-vault subsystems, built on `tracing`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fv_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::for_subsystem(3, "integration-manager");
//!     init_tracing(&config).expect("Failed to init tracing");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FV_SERVICE_NAME` | `fund-vault` | Service name |
//! | `FV_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `FV_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `FV_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{env_filter, init_test_tracing, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Tracing already initialized: {0}")]
    AlreadyInitialized(String),
}
