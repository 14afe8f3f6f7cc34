//! # Tracked Asset Removal
//!
//! Declares assets for removal from the tracked set. Execution moves
//! nothing; the integration manager drops each listed asset whose vault
//! balance is within the dust tolerance.

use super::selectors;
use crate::domain::asset_plan::{AssetPlan, SpendAssetsHandleType};
use crate::ports::outbound::{Adapter, AdapterBase, AdapterError};
use fv_01_vault_ledger::AccountScope;
use serde::{Deserialize, Serialize};
use shared_types::{decode_args, AdapterId, Address, AssetId, Selector, U256};

/// Args of `removeTrackedAssets`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveTrackedAssetsArgs {
    /// Assets to stop tracking.
    pub assets: Vec<AssetId>,
}

/// Adapter running the `Remove` handle type.
#[derive(Clone, Copy, Debug)]
pub struct TrackedAssetRemovalAdapter {
    base: AdapterBase,
}

impl TrackedAssetRemovalAdapter {
    /// Adapter at `address`.
    #[must_use]
    pub fn new(address: AdapterId, integration_manager: Address) -> Self {
        Self {
            base: AdapterBase::new(address, integration_manager),
        }
    }
}

impl Adapter for TrackedAssetRemovalAdapter {
    fn identifier(&self) -> &'static str {
        "TRACKED_ASSET_REMOVAL"
    }

    fn address(&self) -> AdapterId {
        self.base.address
    }

    fn parse_asset_plan(
        &self,
        _vault: Address,
        selector: Selector,
        args: &[u8],
    ) -> Result<AssetPlan, AdapterError> {
        if selector != selectors::remove_tracked_assets() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: RemoveTrackedAssetsArgs = decode_args(args)?;
        Ok(AssetPlan::new(
            SpendAssetsHandleType::Remove,
            args.assets.into_iter().map(|asset| (asset, U256::zero())).collect(),
            Vec::new(),
        ))
    }

    fn execute(
        &self,
        caller: Address,
        _assets: &mut AccountScope<'_, '_>,
        _vault: Address,
        selector: Selector,
        _args: &[u8],
    ) -> Result<(), AdapterError> {
        self.base.ensure_integration_manager(&caller)?;
        if selector != selectors::remove_tracked_assets() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        Ok(())
    }
}
