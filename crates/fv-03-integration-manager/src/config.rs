//! Integration manager configuration.

use fv_01_vault_ledger::{DustTolerance, DEFAULT_MAX_TRACKED_ASSETS};
use serde::{Deserialize, Serialize};
use std::env;

/// Release-wide pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Upper bound on tracked assets per fund.
    pub max_tracked_assets: usize,

    /// Residual balance below which an asset may stop being tracked.
    pub dust_tolerance: DustTolerance,

    /// Reject calls whose incoming assets the valuation source cannot
    /// price. Only applies when a valuation source is configured.
    pub require_receivable_incoming: bool,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            max_tracked_assets: DEFAULT_MAX_TRACKED_ASSETS,
            dust_tolerance: DustTolerance::default(),
            require_receivable_incoming: true,
        }
    }
}

impl IntegrationConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FV_MAX_TRACKED_ASSETS`: tracked asset limit (default: 20)
    /// - `FV_REQUIRE_RECEIVABLE`: enforce receivable incoming assets (default: true)
    /// - `FV_DUST_TOLERANCE`: JSON-encoded [`DustTolerance`] (default: zero per-asset threshold)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_tracked_assets: env::var("FV_MAX_TRACKED_ASSETS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tracked_assets),

            dust_tolerance: env::var("FV_DUST_TOLERANCE")
                .ok()
                .and_then(|v| serde_json::from_str(&v).ok())
                .unwrap_or(defaults.dust_tolerance),

            require_receivable_incoming: env::var("FV_REQUIRE_RECEIVABLE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.require_receivable_incoming),
        }
    }

    /// Builder: set the tracked asset limit.
    #[must_use]
    pub fn with_max_tracked_assets(mut self, limit: usize) -> Self {
        self.max_tracked_assets = limit;
        self
    }

    /// Builder: set the dust tolerance.
    #[must_use]
    pub fn with_dust_tolerance(mut self, tolerance: DustTolerance) -> Self {
        self.dust_tolerance = tolerance;
        self
    }
}
