//! # Lending Integration
//!
//! Lends an underlying asset to a pool in exchange for a receipt token
//! (1:1) and redeems receipt tokens back into the underlying.

use super::selectors;
use crate::domain::asset_plan::{AssetPlan, SpendAssetsHandleType};
use crate::ports::outbound::{Adapter, AdapterBase, AdapterError};
use fv_01_vault_ledger::AccountScope;
use serde::{Deserialize, Serialize};
use shared_types::{decode_args, AdapterId, Address, AssetId, Selector, U256};
use tracing::debug;

/// Args of `lend`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendArgs {
    /// Underlying amount to lend.
    pub amount: U256,
    /// Minimum receipt tokens expected.
    pub min_receipt_amount: U256,
}

/// Args of `redeem`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemArgs {
    /// Receipt tokens to redeem.
    pub receipt_amount: U256,
    /// Minimum underlying expected.
    pub min_underlying_amount: U256,
}

/// Mock lending pool.
///
/// Holds the underlying at `address` and issues the receipt token, so its
/// account must be registered as a protocol issuing `receipt_token`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockLendingPool {
    /// Pool account.
    pub address: Address,
    /// Asset lent.
    pub underlying: AssetId,
    /// Receipt token issued by the pool.
    pub receipt_token: AssetId,
}

impl MockLendingPool {
    /// Take `amount` of underlying from the caller and mint receipts for
    /// whatever the pool actually received.
    pub fn lend(&self, caller: &mut AccountScope<'_, '_>, amount: U256) -> Result<U256, AdapterError> {
        let lender = caller.account();
        let received = caller.transfer(&self.underlying, &self.address, amount)?;
        caller
            .enter_protocol(self.address)?
            .mint(&self.receipt_token, &lender, received)?;
        Ok(received)
    }

    /// Take `receipt_amount` receipts from the caller, burn them and pay
    /// out the underlying.
    pub fn redeem(
        &self,
        caller: &mut AccountScope<'_, '_>,
        receipt_amount: U256,
    ) -> Result<U256, AdapterError> {
        let holder = caller.account();
        let returned = caller.transfer(&self.receipt_token, &self.address, receipt_amount)?;
        let mut pool = caller.enter_protocol(self.address)?;
        pool.burn(&self.receipt_token, returned)?;
        Ok(pool.transfer(&self.underlying, &holder, returned)?)
    }
}

/// Adapter for [`MockLendingPool`].
#[derive(Clone, Debug)]
pub struct LendingAdapter {
    base: AdapterBase,
    pool: MockLendingPool,
}

impl LendingAdapter {
    /// Adapter at `address` for `pool`.
    #[must_use]
    pub fn new(address: AdapterId, integration_manager: Address, pool: MockLendingPool) -> Self {
        Self {
            base: AdapterBase::new(address, integration_manager),
            pool,
        }
    }

    /// The pool this adapter talks to.
    #[must_use]
    pub fn pool(&self) -> &MockLendingPool {
        &self.pool
    }
}

impl Adapter for LendingAdapter {
    fn identifier(&self) -> &'static str {
        "LENDING"
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
        if selector == selectors::lend() {
            let args: LendArgs = decode_args(args)?;
            Ok(AssetPlan::new(
                SpendAssetsHandleType::Transfer,
                vec![(self.pool.underlying, args.amount)],
                vec![(self.pool.receipt_token, args.min_receipt_amount)],
            ))
        } else if selector == selectors::redeem() {
            let args: RedeemArgs = decode_args(args)?;
            Ok(AssetPlan::new(
                SpendAssetsHandleType::Transfer,
                vec![(self.pool.receipt_token, args.receipt_amount)],
                vec![(self.pool.underlying, args.min_underlying_amount)],
            ))
        } else {
            Err(AdapterError::InvalidSelector(selector))
        }
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

        if selector == selectors::lend() {
            let args: LendArgs = decode_args(args)?;
            let lent = self.pool.lend(assets, args.amount)?;
            debug!(vault = %vault, lent = %lent, "Lent to pool");
        } else if selector == selectors::redeem() {
            let args: RedeemArgs = decode_args(args)?;
            let paid = self.pool.redeem(assets, args.receipt_amount)?;
            debug!(vault = %vault, paid = %paid, "Redeemed from pool");
        } else {
            return Err(AdapterError::InvalidSelector(selector));
        }
        Ok(())
    }
}
