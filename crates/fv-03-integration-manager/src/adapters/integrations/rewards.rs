//! # Rewards Integration
//!
//! Claims accrued rewards from a distributor. Nothing leaves the vault, so
//! the call runs under the `None` handle type.

use super::selectors;
use crate::domain::asset_plan::AssetPlan;
use crate::ports::outbound::{Adapter, AdapterBase, AdapterError};
use fv_01_vault_ledger::{AccountScope, AssetReader};
use serde::{Deserialize, Serialize};
use shared_types::{decode_args, AdapterId, Address, AssetId, Selector, U256};
use tracing::debug;

/// Args of `claimRewards`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRewardsArgs {
    /// Reward token.
    pub reward_asset: AssetId,
    /// Amount to claim; capped by what the distributor holds.
    pub amount: U256,
}

/// Adapter paying rewards out of a distributor account straight to the
/// vault.
#[derive(Clone, Copy, Debug)]
pub struct RewardsAdapter {
    base: AdapterBase,
    distributor: Address,
}

impl RewardsAdapter {
    /// Adapter at `address` claiming from `distributor`.
    #[must_use]
    pub fn new(address: AdapterId, integration_manager: Address, distributor: Address) -> Self {
        Self {
            base: AdapterBase::new(address, integration_manager),
            distributor,
        }
    }

    /// Account rewards are paid from.
    #[must_use]
    pub fn distributor(&self) -> Address {
        self.distributor
    }
}

impl Adapter for RewardsAdapter {
    fn identifier(&self) -> &'static str {
        "REWARDS"
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
        if selector != selectors::claim_rewards() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: ClaimRewardsArgs = decode_args(args)?;
        Ok(AssetPlan::incoming_only(
            vec![args.reward_asset],
            vec![U256::zero()],
        ))
    }

    fn execute(
        &self,
        caller: Address,
        assets: &mut AccountScope<'_, '_>,
        vault: Address,
        selector: Selector,
        args: &[u8],
    ) -> Result<(), AdapterError> {
        self.base.ensure_integration_manager(&caller)?;
        if selector != selectors::claim_rewards() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: ClaimRewardsArgs = decode_args(args)?;
        let mut distributor = assets.enter_protocol(self.distributor)?;
        let available = distributor.balance_of(&args.reward_asset, &self.distributor);
        let claimed = distributor.transfer(&args.reward_asset, &vault, args.amount.min(available))?;
        debug!(vault = %vault, asset = %args.reward_asset, claimed = %claimed, "Rewards claimed");
        Ok(())
    }
}
