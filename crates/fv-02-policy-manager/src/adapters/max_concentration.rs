//! `MAX_CONCENTRATION`: after a call, no incoming asset other than the
//! denomination asset may exceed a share of the fund's gross asset value.
//!
//! GAV here is the sum of tracked vault balances priced in the
//! denomination asset. Any unpriceable tracked asset fails the rule.

use crate::domain::config::{decode_settings, PolicyConfig};
use crate::domain::errors::PolicyError;
use crate::ports::outbound::{Policy, RuleContext};
use serde::{Deserialize, Serialize};
use shared_types::{AssetId, FundId, HookContext, PolicyHook, U256};
use tracing::{debug, warn};

const MAX_BPS: u16 = 10_000;

/// Concentration cap in basis points of GAV.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxConcentrationSettings {
    /// Maximum share of GAV a single non-denomination asset may hold.
    pub max_concentration_bps: u16,
}

/// Max concentration policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxConcentrationPolicy;

impl MaxConcentrationPolicy {
    /// Policy identifier.
    pub const IDENTIFIER: &'static str = "MAX_CONCENTRATION";

    fn value_of(ctx: &RuleContext<'_>, asset: &AssetId) -> Result<Option<U256>, PolicyError> {
        let valuation = ctx
            .valuation
            .ok_or_else(|| PolicyError::ValuationUnavailable(Self::IDENTIFIER.to_string()))?;
        let (value, valid) =
            valuation.price_of(asset, ctx.vault_balance(asset), &ctx.denomination_asset);
        Ok(valid.then_some(value))
    }

    fn gross_asset_value(ctx: &RuleContext<'_>) -> Result<Option<U256>, PolicyError> {
        let mut gav = U256::zero();
        for asset in ctx.tracked_assets {
            let Some(value) = Self::value_of(ctx, asset)? else {
                return Ok(None);
            };
            gav = match gav.checked_add(value) {
                Some(sum) => sum,
                None => return Ok(None),
            };
        }
        Ok(Some(gav))
    }
}

impl Policy for MaxConcentrationPolicy {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn implemented_hooks(&self) -> Vec<PolicyHook> {
        vec![PolicyHook::POST_CALL_ON_INTEGRATION]
    }

    fn add_fund_settings(&self, fund: FundId, config: &[u8]) -> Result<PolicyConfig, PolicyError> {
        let settings: MaxConcentrationSettings = decode_settings(Self::IDENTIFIER, config)?;
        if settings.max_concentration_bps == 0 || settings.max_concentration_bps > MAX_BPS {
            return Err(PolicyError::invalid_settings(
                Self::IDENTIFIER,
                format!(
                    "max_concentration_bps must be in 1..={MAX_BPS}, got {}",
                    settings.max_concentration_bps
                ),
            ));
        }
        debug!(fund = %fund, bps = settings.max_concentration_bps, "Concentration cap set");
        PolicyConfig::from_settings(Self::IDENTIFIER, &settings)
    }

    fn is_updatable(&self) -> bool {
        true
    }

    fn update_fund_settings(
        &self,
        fund: FundId,
        _current: &PolicyConfig,
        config: &[u8],
    ) -> Result<PolicyConfig, PolicyError> {
        self.add_fund_settings(fund, config)
    }

    fn validate_rule(
        &self,
        ctx: &RuleContext<'_>,
        settings: &PolicyConfig,
        _hook: PolicyHook,
        context: &HookContext,
    ) -> Result<bool, PolicyError> {
        let settings: MaxConcentrationSettings = settings.settings(Self::IDENTIFIER)?;

        let candidates: Vec<&AssetId> = context
            .incoming_assets()
            .iter()
            .filter(|asset| **asset != ctx.denomination_asset)
            .collect();
        if candidates.is_empty() {
            return Ok(true);
        }

        let Some(gav) = Self::gross_asset_value(ctx)? else {
            warn!(fund = %ctx.fund, "GAV could not be priced");
            return Ok(false);
        };
        if gav.is_zero() {
            return Ok(true);
        }

        let cap = U256::from(settings.max_concentration_bps);
        for asset in candidates {
            let Some(value) = Self::value_of(ctx, asset)? else {
                return Ok(false);
            };
            // value / gav > bps / 10_000, compared without division.
            let lhs = value.checked_mul(U256::from(MAX_BPS));
            let rhs = gav.checked_mul(cap);
            match (lhs, rhs) {
                (Some(lhs), Some(rhs)) if lhs <= rhs => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }
}
