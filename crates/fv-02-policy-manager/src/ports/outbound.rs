//! # Driven Ports (SPI - Outbound)
//!
//! The policy plugin interface and the read-only fund view a rule sees.

use crate::domain::config::PolicyConfig;
use crate::domain::errors::PolicyError;
use fv_01_vault_ledger::{AssetReader, ValueInterpreter};
use shared_types::{Address, AssetId, FundId, HookContext, PolicyHook, U256};

// =============================================================================
// RULE CONTEXT
// =============================================================================

/// Fund state visible to a rule while it is evaluated.
///
/// During a call-on-integration pipeline `assets` is the staged book and
/// `tracked_assets` the staged tracked set, so post hooks see the state
/// that would be committed.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Fund being validated.
    pub fund: FundId,
    /// Vault address of the fund.
    pub vault: Address,
    /// Denomination asset of the fund.
    pub denomination_asset: AssetId,
    /// Tracked assets of the fund.
    pub tracked_assets: &'a [AssetId],
    /// Balances.
    pub assets: &'a dyn AssetReader,
    /// Price source, if one is configured.
    pub valuation: Option<&'a dyn ValueInterpreter>,
}

impl RuleContext<'_> {
    /// Vault balance of `asset`.
    #[must_use]
    pub fn vault_balance(&self, asset: &AssetId) -> U256 {
        self.assets.balance_of(asset, &self.vault)
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("fund", &self.fund)
            .field("vault", &self.vault)
            .field("denomination_asset", &self.denomination_asset)
            .field("tracked_assets", &self.tracked_assets)
            .field("valuation", &self.valuation.is_some())
            .finish()
    }
}

// =============================================================================
// POLICY PLUGIN
// =============================================================================

/// A pluggable boolean rule.
///
/// Implementations must be stateless with respect to funds: everything
/// fund-specific lives in the [`PolicyConfig`] returned by
/// [`Policy::add_fund_settings`].
pub trait Policy: Send + Sync {
    /// Stable identifier, also the reason reported on rejection.
    fn identifier(&self) -> &'static str;

    /// Hook points this policy is evaluated at.
    fn implemented_hooks(&self) -> Vec<PolicyHook>;

    /// Validate and normalize settings submitted when the policy is
    /// enabled for `fund`.
    fn add_fund_settings(&self, fund: FundId, config: &[u8]) -> Result<PolicyConfig, PolicyError>;

    /// Whether settings may change after enabling.
    fn is_updatable(&self) -> bool {
        false
    }

    /// Produce new settings from the current ones and an update document.
    fn update_fund_settings(
        &self,
        _fund: FundId,
        _current: &PolicyConfig,
        _config: &[u8],
    ) -> Result<PolicyConfig, PolicyError> {
        Err(PolicyError::NotUpdatable(self.identifier().to_string()))
    }

    /// Whether a fund may disable this policy once enabled.
    fn can_disable(&self) -> bool {
        false
    }

    /// Evaluate the rule. `Ok(false)` rejects the enclosing operation.
    fn validate_rule(
        &self,
        ctx: &RuleContext<'_>,
        settings: &PolicyConfig,
        hook: PolicyHook,
        context: &HookContext,
    ) -> Result<bool, PolicyError>;

    /// Whether this policy is evaluated at `hook`.
    fn implements(&self, hook: PolicyHook) -> bool {
        self.implemented_hooks().contains(&hook)
    }
}
