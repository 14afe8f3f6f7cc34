use shared_types::{FundId, PolicyHook};
use thiserror::Error;

/// Errors raised while managing or evaluating policies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Policy not registered: {0}")]
    NotRegistered(String),

    #[error("Policy already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Policy {policy} already enabled for {fund}")]
    AlreadyEnabled { policy: String, fund: FundId },

    #[error("Policy {policy} not enabled for {fund}")]
    NotEnabled { policy: String, fund: FundId },

    #[error("Policy {0} is not updatable")]
    NotUpdatable(String),

    #[error("Policy {0} cannot be disabled")]
    CannotDisable(String),

    #[error("Invalid settings for {policy}: {reason}")]
    InvalidSettings { policy: String, reason: String },

    #[error("Hook {hook} fired with a context of another hook family")]
    ContextMismatch { hook: PolicyHook },

    /// The normal "rule said no" outcome.
    #[error("Rule evaluated to false: {policy} at {hook}")]
    RuleFailed { policy: String, hook: PolicyHook },

    #[error("Rule evaluation failed in {policy}: {reason}")]
    Evaluation { policy: String, reason: String },

    #[error("No valuation source available to {0}")]
    ValuationUnavailable(String),
}

impl PolicyError {
    /// Identifier of the policy the error is about, if any.
    #[must_use]
    pub fn policy(&self) -> Option<&str> {
        match self {
            Self::NotRegistered(p)
            | Self::AlreadyRegistered(p)
            | Self::NotUpdatable(p)
            | Self::CannotDisable(p)
            | Self::ValuationUnavailable(p) => Some(p),
            Self::AlreadyEnabled { policy, .. }
            | Self::NotEnabled { policy, .. }
            | Self::InvalidSettings { policy, .. }
            | Self::RuleFailed { policy, .. }
            | Self::Evaluation { policy, .. } => Some(policy),
            Self::ContextMismatch { .. } => None,
        }
    }

    pub(crate) fn invalid_settings(policy: &str, reason: impl ToString) -> Self {
        Self::InvalidSettings {
            policy: policy.to_string(),
            reason: reason.to_string(),
        }
    }
}
