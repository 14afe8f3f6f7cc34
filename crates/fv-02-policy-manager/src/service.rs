//! # Policy Manager Service
//!
//! Enables, updates and disables policies for a fund and dispatches hook
//! evaluation. Fund-scoped state ([`FundPolicies`]) is owned by the fund
//! and passed in by reference; the manager itself only holds the
//! release-wide [`PolicyRegistry`].

use crate::domain::errors::PolicyError;
use crate::domain::fund_policies::{EnabledPolicy, FundPolicies};
use crate::domain::registry::PolicyRegistry;
use crate::ports::outbound::{Policy, RuleContext};
use parking_lot::RwLock;
use shared_types::{FundId, HookContext, PolicyHook};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Policy manager.
#[derive(Debug, Default)]
pub struct PolicyManager {
    registry: RwLock<PolicyRegistry>,
}

impl PolicyManager {
    /// Manager with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with every built-in policy registered.
    #[must_use]
    pub fn with_builtin_policies() -> Self {
        let manager = Self::new();
        {
            let mut registry = manager.registry.write();
            for policy in crate::adapters::builtin_policies() {
                let registered = registry.register(policy);
                debug_assert!(registered.is_ok(), "built-in policy registered twice");
            }
        }
        manager
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    /// Make `policy` available to funds.
    pub fn register_policy(&self, policy: Arc<dyn Policy>) -> Result<(), PolicyError> {
        let identifier = policy.identifier();
        self.registry.write().register(policy)?;
        info!(policy = identifier, "Policy registered");
        Ok(())
    }

    /// Withdraw a policy from the registry.
    pub fn deregister_policy(&self, identifier: &str) -> Result<(), PolicyError> {
        self.registry.write().deregister(identifier)?;
        info!(policy = identifier, "Policy deregistered");
        Ok(())
    }

    /// Registered identifiers in registration order.
    #[must_use]
    pub fn registered_policies(&self) -> Vec<&'static str> {
        self.registry.read().identifiers()
    }

    /// Whether `identifier` is registered.
    #[must_use]
    pub fn is_registered(&self, identifier: &str) -> bool {
        self.registry.read().contains(identifier)
    }

    // =========================================================================
    // FUND SETTINGS
    // =========================================================================

    /// Enable a registered policy for `fund` with the given settings.
    pub fn enable_policy(
        &self,
        fund: FundId,
        policies: &mut FundPolicies,
        identifier: &str,
        config: &[u8],
    ) -> Result<(), PolicyError> {
        let policy = self
            .registry
            .read()
            .get(identifier)
            .ok_or_else(|| PolicyError::NotRegistered(identifier.to_string()))?;

        if policies.is_enabled(identifier) {
            return Err(PolicyError::AlreadyEnabled {
                policy: identifier.to_string(),
                fund,
            });
        }

        let config = policy.add_fund_settings(fund, config)?;
        policies.push(EnabledPolicy { policy, config });
        info!(fund = %fund, policy = identifier, "Policy enabled");
        Ok(())
    }

    /// Replace the settings of an enabled, updatable policy.
    pub fn update_policy_settings(
        &self,
        fund: FundId,
        policies: &mut FundPolicies,
        identifier: &str,
        config: &[u8],
    ) -> Result<(), PolicyError> {
        let entry = policies
            .get_mut(identifier)
            .ok_or_else(|| PolicyError::NotEnabled {
                policy: identifier.to_string(),
                fund,
            })?;

        if !entry.policy.is_updatable() {
            return Err(PolicyError::NotUpdatable(identifier.to_string()));
        }

        entry.config = entry
            .policy
            .update_fund_settings(fund, &entry.config, config)?;
        info!(fund = %fund, policy = identifier, "Policy settings updated");
        Ok(())
    }

    /// Disable an enabled policy that allows it.
    pub fn disable_policy(
        &self,
        fund: FundId,
        policies: &mut FundPolicies,
        identifier: &str,
    ) -> Result<(), PolicyError> {
        let entry = policies.get(identifier).ok_or_else(|| PolicyError::NotEnabled {
            policy: identifier.to_string(),
            fund,
        })?;

        if !entry.policy.can_disable() {
            return Err(PolicyError::CannotDisable(identifier.to_string()));
        }

        policies.remove(identifier);
        info!(fund = %fund, policy = identifier, "Policy disabled");
        Ok(())
    }

    // =========================================================================
    // HOOK DISPATCH
    // =========================================================================

    /// Evaluate every enabled policy implementing `hook`, in enable order.
    ///
    /// Stops at the first rule that evaluates to `false` and reports it as
    /// [`PolicyError::RuleFailed`]. A rule that errors is reported as
    /// [`PolicyError::Evaluation`] under the same policy name.
    #[instrument(skip(self, policies, ctx, context), fields(fund = %ctx.fund, hook = %hook))]
    pub fn validate_hook(
        &self,
        policies: &FundPolicies,
        ctx: &RuleContext<'_>,
        hook: PolicyHook,
        context: &HookContext,
    ) -> Result<(), PolicyError> {
        if !context.matches(hook.kind) {
            return Err(PolicyError::ContextMismatch { hook });
        }

        for entry in policies.iter().filter(|e| e.policy.implements(hook)) {
            let identifier = entry.policy.identifier();
            let passed = entry
                .policy
                .validate_rule(ctx, &entry.config, hook, context)
                .map_err(|e| match e {
                    PolicyError::Evaluation { .. } | PolicyError::ValuationUnavailable(_) => e,
                    other => PolicyError::Evaluation {
                        policy: identifier.to_string(),
                        reason: other.to_string(),
                    },
                })?;

            if !passed {
                warn!(policy = identifier, "Rule evaluated to false");
                return Err(PolicyError::RuleFailed {
                    policy: identifier.to_string(),
                    hook,
                });
            }
            debug!(policy = identifier, "Rule passed");
        }
        Ok(())
    }
}
