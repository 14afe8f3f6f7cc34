//! # Dust Tolerance
//!
//! Decides whether a residual balance is small enough to stop tracking.
//!
//! Two bases are supported:
//! - [`DustTolerance::Valued`]: the balance is priced in a reference asset
//!   through a [`ValueInterpreter`] and compared to one threshold.
//! - [`DustTolerance::PerAsset`]: the raw balance is compared to a
//!   per-asset threshold, no pricing involved.
//!
//! A balance is dust when it is less than or equal to the threshold.

use crate::ports::outbound::ValueInterpreter;
use serde::{Deserialize, Serialize};
use shared_types::{AssetId, U256};

/// Configured dust tolerance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DustTolerance {
    /// Value the balance in `reference_asset`.
    Valued {
        /// Asset the threshold is denominated in.
        reference_asset: AssetId,
        /// Maximum value still considered dust.
        threshold: U256,
    },
    /// Compare raw balances.
    PerAsset {
        /// Threshold for assets without an override.
        default: U256,
        /// Asset-specific thresholds.
        overrides: Vec<(AssetId, U256)>,
    },
}

impl Default for DustTolerance {
    fn default() -> Self {
        Self::PerAsset {
            default: U256::zero(),
            overrides: Vec::new(),
        }
    }
}

/// Outcome of a dust check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DustEvaluation {
    /// At or below the threshold.
    Within {
        /// Balance (or its value) that was compared.
        value: U256,
        /// Threshold it was compared to.
        threshold: U256,
    },
    /// Above the threshold.
    Exceeds {
        /// Balance (or its value) that was compared.
        value: U256,
        /// Threshold it was compared to.
        threshold: U256,
    },
    /// The valuation collaborator could not price the balance.
    Unpriced,
}

impl DustEvaluation {
    /// True only for [`DustEvaluation::Within`].
    #[must_use]
    pub fn is_dust(&self) -> bool {
        matches!(self, Self::Within { .. })
    }
}

impl DustTolerance {
    /// Raw-balance tolerance with a single threshold for every asset.
    #[must_use]
    pub fn per_asset(default: U256) -> Self {
        Self::PerAsset {
            default,
            overrides: Vec::new(),
        }
    }

    /// Value-based tolerance.
    #[must_use]
    pub fn valued(reference_asset: AssetId, threshold: U256) -> Self {
        Self::Valued {
            reference_asset,
            threshold,
        }
    }

    /// Builder: set an override for `asset` (per-asset basis only).
    #[must_use]
    pub fn with_override(mut self, asset: AssetId, threshold: U256) -> Self {
        if let Self::PerAsset { overrides, .. } = &mut self {
            overrides.retain(|(a, _)| *a != asset);
            overrides.push((asset, threshold));
        }
        self
    }

    /// Threshold that applies to `asset`.
    #[must_use]
    pub fn threshold_for(&self, asset: &AssetId) -> U256 {
        match self {
            Self::Valued { threshold, .. } => *threshold,
            Self::PerAsset { default, overrides } => overrides
                .iter()
                .find(|(a, _)| a == asset)
                .map(|(_, t)| *t)
                .unwrap_or(*default),
        }
    }

    /// Evaluate `balance` of `asset`.
    ///
    /// The value basis needs `valuation`; without one every balance is
    /// [`DustEvaluation::Unpriced`].
    #[must_use]
    pub fn evaluate(
        &self,
        asset: &AssetId,
        balance: U256,
        valuation: Option<&dyn ValueInterpreter>,
    ) -> DustEvaluation {
        let (value, threshold) = match self {
            Self::Valued {
                reference_asset,
                threshold,
            } => {
                let Some(valuation) = valuation else {
                    return DustEvaluation::Unpriced;
                };
                let (value, valid) = valuation.price_of(asset, balance, reference_asset);
                if !valid {
                    return DustEvaluation::Unpriced;
                }
                (value, *threshold)
            }
            Self::PerAsset { .. } => (balance, self.threshold_for(asset)),
        };

        if value <= threshold {
            DustEvaluation::Within { value, threshold }
        } else {
            DustEvaluation::Exceeds { value, threshold }
        }
    }
}
