//! # Exchange Integration
//!
//! Takes an order on an exchange that pulls the outgoing asset from the
//! vault through an allowance and pays the incoming asset straight to the
//! vault.

use super::selectors;
use crate::domain::asset_plan::{AssetPlan, SpendAssetsHandleType};
use crate::ports::outbound::{Adapter, AdapterBase, AdapterError};
use fv_01_vault_ledger::{AccountScope, FixedRateValuation, ValueInterpreter};
use serde::{Deserialize, Serialize};
use shared_types::{decode_args, AdapterId, Address, AssetId, Selector, U256};
use tracing::debug;

/// Args of `takeOrder`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeOrderArgs {
    /// Asset sold.
    pub outgoing_asset: AssetId,
    /// Amount sold.
    pub outgoing_amount: U256,
    /// Asset bought.
    pub incoming_asset: AssetId,
    /// Minimum amount bought.
    pub min_incoming_amount: U256,
}

/// Mock exchange quoting fixed rates out of its own reserves.
#[derive(Clone, Debug)]
pub struct MockExchange {
    /// Exchange account.
    pub address: Address,
    /// Unit prices.
    pub rates: FixedRateValuation,
}

impl MockExchange {
    /// Pull `amount` of `sell` from `seller` through the allowance it
    /// granted the caller, then pay the quoted amount of `buy` to
    /// `recipient` out of the exchange's reserves.
    pub fn swap(
        &self,
        caller: &mut AccountScope<'_, '_>,
        seller: &Address,
        recipient: &Address,
        sell: &AssetId,
        amount: U256,
        buy: &AssetId,
    ) -> Result<U256, AdapterError> {
        let received = caller.transfer_from(sell, seller, &self.address, amount)?;
        let (quote, valid) = self.rates.price_of(sell, received, buy);
        if !valid {
            return Err(AdapterError::Protocol(format!("no quote for {sell} -> {buy}")));
        }
        Ok(caller
            .enter_protocol(self.address)?
            .transfer(buy, recipient, quote)?)
    }
}

/// Adapter for [`MockExchange`].
#[derive(Clone, Debug)]
pub struct SwapAdapter {
    base: AdapterBase,
    exchange: MockExchange,
}

impl SwapAdapter {
    /// Adapter at `address` for `exchange`.
    #[must_use]
    pub fn new(address: AdapterId, integration_manager: Address, exchange: MockExchange) -> Self {
        Self {
            base: AdapterBase::new(address, integration_manager),
            exchange,
        }
    }
}

impl Adapter for SwapAdapter {
    fn identifier(&self) -> &'static str {
        "EXCHANGE"
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
        if selector != selectors::take_order() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: TakeOrderArgs = decode_args(args)?;
        Ok(AssetPlan::new(
            SpendAssetsHandleType::Approve,
            vec![(args.outgoing_asset, args.outgoing_amount)],
            vec![(args.incoming_asset, args.min_incoming_amount)],
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
        if selector != selectors::take_order() {
            return Err(AdapterError::InvalidSelector(selector));
        }
        let args: TakeOrderArgs = decode_args(args)?;
        let bought = self.exchange.swap(
            assets,
            &vault,
            &vault,
            &args.outgoing_asset,
            args.outgoing_amount,
            &args.incoming_asset,
        )?;
        debug!(vault = %vault, sold = %args.outgoing_amount, bought = %bought, "Order taken");
        Ok(())
    }
}
