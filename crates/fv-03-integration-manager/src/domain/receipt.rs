//! Record of a committed call.

use crate::domain::asset_plan::SpendAssetsHandleType;
use serde::{Deserialize, Serialize};
use shared_types::{AdapterId, AssetId, FundId, Selector, U256};
use uuid::Uuid;

/// An asset and an amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    /// Asset.
    pub asset: AssetId,
    /// Amount.
    pub amount: U256,
}

impl AssetAmount {
    /// Pair an asset with an amount.
    #[must_use]
    pub fn new(asset: AssetId, amount: U256) -> Self {
        Self { asset, amount }
    }
}

/// Outcome of a committed call-on-integration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Correlation id, also carried by the emitted event and log spans.
    pub correlation_id: Uuid,
    /// Fund.
    pub fund: FundId,
    /// Adapter called.
    pub adapter: AdapterId,
    /// Action selector.
    pub selector: Selector,
    /// Handle type the adapter declared.
    pub handle_type: SpendAssetsHandleType,
    /// Declared incoming assets with their minimum amounts.
    pub declared_incoming: Vec<AssetAmount>,
    /// Incoming assets with the amounts actually received.
    pub actual_incoming: Vec<AssetAmount>,
    /// Declared spend assets with their maximum amounts.
    pub declared_spend: Vec<AssetAmount>,
    /// Spend assets with the amounts actually spent.
    pub actual_spend: Vec<AssetAmount>,
    /// Assets that started being tracked.
    pub tracked_assets_added: Vec<AssetId>,
    /// Assets that stopped being tracked.
    pub tracked_assets_removed: Vec<AssetId>,
}

impl Receipt {
    /// Amount actually received of `asset`, zero if it was not incoming.
    #[must_use]
    pub fn received(&self, asset: &AssetId) -> U256 {
        find(&self.actual_incoming, asset)
    }

    /// Amount actually spent of `asset`, zero if it was not spent.
    #[must_use]
    pub fn spent(&self, asset: &AssetId) -> U256 {
        find(&self.actual_spend, asset)
    }
}

fn find(amounts: &[AssetAmount], asset: &AssetId) -> U256 {
    amounts
        .iter()
        .find(|a| a.asset == *asset)
        .map(|a| a.amount)
        .unwrap_or_default()
}
