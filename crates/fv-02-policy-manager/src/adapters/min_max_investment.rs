//! `MIN_MAX_INVESTMENT`: bounds the denomination-asset amount of a single
//! share purchase.

use crate::domain::config::{decode_settings, PolicyConfig};
use crate::domain::errors::PolicyError;
use crate::ports::outbound::{Policy, RuleContext};
use serde::{Deserialize, Serialize};
use shared_types::{FundId, HookContext, PolicyHook, U256};
use tracing::debug;

/// Investment bounds. Both are inclusive; a zero maximum means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxInvestmentSettings {
    /// Smallest accepted investment.
    pub min_investment_amount: U256,
    /// Largest accepted investment, zero for no upper bound.
    pub max_investment_amount: U256,
}

impl MinMaxInvestmentSettings {
    fn validate(&self) -> Result<(), String> {
        if !self.max_investment_amount.is_zero()
            && self.min_investment_amount >= self.max_investment_amount
        {
            return Err(format!(
                "minimum {} must be below maximum {}",
                self.min_investment_amount, self.max_investment_amount
            ));
        }
        Ok(())
    }

    /// Whether `amount` is within bounds.
    #[must_use]
    pub fn accepts(&self, amount: U256) -> bool {
        amount >= self.min_investment_amount
            && (self.max_investment_amount.is_zero() || amount <= self.max_investment_amount)
    }
}

/// Min/max investment policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinMaxInvestmentPolicy;

impl MinMaxInvestmentPolicy {
    /// Policy identifier.
    pub const IDENTIFIER: &'static str = "MIN_MAX_INVESTMENT";

    fn parse(config: &[u8]) -> Result<MinMaxInvestmentSettings, PolicyError> {
        let settings: MinMaxInvestmentSettings = decode_settings(Self::IDENTIFIER, config)?;
        settings
            .validate()
            .map_err(|reason| PolicyError::invalid_settings(Self::IDENTIFIER, reason))?;
        Ok(settings)
    }
}

impl Policy for MinMaxInvestmentPolicy {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn implemented_hooks(&self) -> Vec<PolicyHook> {
        vec![PolicyHook::POST_BUY_SHARES]
    }

    fn add_fund_settings(&self, fund: FundId, config: &[u8]) -> Result<PolicyConfig, PolicyError> {
        let settings = Self::parse(config)?;
        debug!(
            fund = %fund,
            min = %settings.min_investment_amount,
            max = %settings.max_investment_amount,
            "Investment bounds set"
        );
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

    fn can_disable(&self) -> bool {
        true
    }

    fn validate_rule(
        &self,
        _ctx: &RuleContext<'_>,
        settings: &PolicyConfig,
        _hook: PolicyHook,
        context: &HookContext,
    ) -> Result<bool, PolicyError> {
        let HookContext::BuyShares {
            investment_amount, ..
        } = context
        else {
            return Ok(true);
        };
        let bounds: MinMaxInvestmentSettings = settings.settings(Self::IDENTIFIER)?;
        Ok(bounds.accepts(*investment_amount))
    }
}
