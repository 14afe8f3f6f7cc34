//! Fixed-rate price source.

use crate::ports::outbound::ValueInterpreter;
use shared_types::{AssetId, U256};
use std::collections::HashMap;

/// Prices every asset against a common unit at a fixed rate.
///
/// `value = amount * rate(asset) / rate(reference)`. Assets without a rate
/// and arithmetic overflow yield an invalid price.
#[derive(Clone, Debug, Default)]
pub struct FixedRateValuation {
    rates: HashMap<AssetId, U256>,
}

impl FixedRateValuation {
    /// Empty price table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the unit rate of `asset`.
    #[must_use]
    pub fn with_rate(mut self, asset: AssetId, rate: U256) -> Self {
        self.set_rate(asset, rate);
        self
    }

    /// Set the unit rate of `asset`. A zero rate removes it.
    pub fn set_rate(&mut self, asset: AssetId, rate: U256) {
        if rate.is_zero() {
            self.rates.remove(&asset);
        } else {
            self.rates.insert(asset, rate);
        }
    }
}

impl ValueInterpreter for FixedRateValuation {
    fn price_of(&self, asset: &AssetId, amount: U256, reference_asset: &AssetId) -> (U256, bool) {
        let (Some(rate), Some(reference_rate)) =
            (self.rates.get(asset), self.rates.get(reference_asset))
        else {
            return (U256::zero(), false);
        };

        match amount.checked_mul(*rate) {
            Some(product) => (product / *reference_rate, true),
            None => (U256::zero(), false),
        }
    }

    fn is_supported_asset(&self, asset: &AssetId) -> bool {
        self.rates.contains_key(asset)
    }
}
