//! # Liquidity Pool Integration
//!
//! Redeems pool shares into the pool's two underlying tokens.

use super::selectors;
use crate::domain::asset_plan::{AssetPlan, SpendAssetsHandleType};
use crate::ports::outbound::{Adapter, AdapterBase, AdapterError};
use fv_01_vault_ledger::{AccountScope, AssetReader};
use serde::{Deserialize, Serialize};
use shared_types::{decode_args, AdapterId, Address, AssetId, Selector, U256};
use tracing::debug;

/// Args of `redeem`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRedeemArgs {
    /// Pool shares to redeem.
    pub shares: U256,
    /// Minimum amount of token A.
    pub min_token_a: U256,
    /// Minimum amount of token B.
    pub min_token_b: U256,
}

/// Mock two-token pool paying a fixed amount of each token per share,
/// capped by its reserves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockLiquidityPool {
    /// Pool account holding the reserves.
    pub address: Address,
    /// Pool share token.
    pub share_token: AssetId,
    /// First underlying token.
    pub token_a: AssetId,
    /// Second underlying token.
    pub token_b: AssetId,
    /// Token A paid per share.
    pub a_per_share: U256,
    /// Token B paid per share.
    pub b_per_share: U256,
}

impl MockLiquidityPool {
    fn payout(
        &self,
        pool: &mut AccountScope<'_, '_>,
        token: &AssetId,
        per_share: U256,
        shares: U256,
        to: &Address,
    ) -> Result<U256, AdapterError> {
        let owed = shares
            .checked_mul(per_share)
            .ok_or_else(|| AdapterError::Protocol("payout overflow".to_string()))?;
        let amount = owed.min(pool.balance_of(token, &self.address));
        Ok(pool.transfer(token, to, amount)?)
    }

    /// Take `shares` from the caller, burn them and pay out both tokens.
    pub fn redeem(
        &self,
        caller: &mut AccountScope<'_, '_>,
        shares: U256,
    ) -> Result<(U256, U256), AdapterError> {
        let holder = caller.account();
        let returned = caller.transfer(&self.share_token, &self.address, shares)?;
        let mut pool = caller.enter_protocol(self.address)?;
        pool.burn(&self.share_token, returned)?;
        let a = self.payout(&mut pool, &self.token_a, self.a_per_share, returned, &holder)?;
        let b = self.payout(&mut pool, &self.token_b, self.b_per_share, returned, &holder)?;
        Ok((a, b))
    }
}

/// Adapter for [`MockLiquidityPool`].
#[derive(Clone, Debug)]
pub struct PoolAdapter {
    base: AdapterBase,
    pool: MockLiquidityPool,
}

impl PoolAdapter {
    /// Adapter at `address` for `pool`.
    #[must_use]
    pub fn new(address: AdapterId, integration_manager: Address, pool: MockLiquidityPool) -> Self {
        Self {
            base: AdapterBase::new(address, integration_manager),
            pool,
        }
    }

    /// The pool this adapter talks to.
    #[must_use]
    pub fn pool(&self) -> &MockLiquidityPool {
        &self.pool
    }
}

impl Adapter for PoolAdapter {
    fn identifier(&self) -> &'static str {
        "LIQUIDITY_POOL"
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
        if selector != selectors::redeem() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: PoolRedeemArgs = decode_args(args)?;
        Ok(AssetPlan::new(
            SpendAssetsHandleType::Transfer,
            vec![(self.pool.share_token, args.shares)],
            vec![
                (self.pool.token_a, args.min_token_a),
                (self.pool.token_b, args.min_token_b),
            ],
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
        if selector != selectors::redeem() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: PoolRedeemArgs = decode_args(args)?;
        let (a, b) = self.pool.redeem(assets, args.shares)?;
        debug!(vault = %vault, token_a = %a, token_b = %b, "Pool shares redeemed");
        Ok(())
    }
}
