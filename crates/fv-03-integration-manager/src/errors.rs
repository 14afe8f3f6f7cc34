//! Caller-facing error taxonomy of the integration manager.

use fv_02_policy_manager::PolicyError;
use shared_types::{AdapterId, Address, FundId, PolicyHook};
use thiserror::Error;

/// Failure classes. Every class aborts the whole operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request, rejected before any asset movement.
    Validation,
    /// Reconciliation found an over-spend or under-receipt.
    CustodyViolation,
    /// A named policy rejected the operation.
    PolicyRejection,
    /// The adapter's external interaction failed.
    ExternalCallFailure,
    /// Caller lacks the required role.
    Unauthorized,
    /// Another operation on the same fund is in flight.
    Reentrancy,
}

impl ErrorKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::CustodyViolation => "custody_violation",
            Self::PolicyRejection => "policy_rejection",
            Self::ExternalCallFailure => "external_call_failure",
            Self::Unauthorized => "unauthorized",
            Self::Reentrancy => "reentrancy",
        }
    }
}

/// Integration manager errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Custody violation: {0}")]
    CustodyViolation(String),

    #[error("Rule evaluated to false: {policy} at {hook} ({reason})")]
    PolicyRejection {
        policy: String,
        hook: PolicyHook,
        reason: String,
    },

    #[error("External call to adapter {adapter} failed: {reason}")]
    ExternalCallFailure { adapter: AdapterId, reason: String },

    #[error("Unauthorized: {caller} cannot {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("Reentrancy: {0} has an operation in flight")]
    Reentrancy(FundId),
}

impl IntegrationError {
    /// Failure class.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::CustodyViolation(_) => ErrorKind::CustodyViolation,
            Self::PolicyRejection { .. } => ErrorKind::PolicyRejection,
            Self::ExternalCallFailure { .. } => ErrorKind::ExternalCallFailure,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Reentrancy(_) => ErrorKind::Reentrancy,
        }
    }

    /// Policy that rejected the operation, if that is what happened.
    #[must_use]
    pub fn rejecting_policy(&self) -> Option<&str> {
        match self {
            Self::PolicyRejection { policy, .. } => Some(policy),
            _ => None,
        }
    }

    pub(crate) fn validation(reason: impl ToString) -> Self {
        Self::Validation(reason.to_string())
    }

    pub(crate) fn custody(reason: impl ToString) -> Self {
        Self::CustodyViolation(reason.to_string())
    }

    /// Map a policy manager failure raised while evaluating `hook`.
    pub(crate) fn from_policy(hook: PolicyHook, err: PolicyError) -> Self {
        match err {
            PolicyError::RuleFailed { policy, hook } => Self::PolicyRejection {
                reason: "rule evaluated to false".to_string(),
                policy,
                hook,
            },
            other => Self::PolicyRejection {
                policy: other.policy().unwrap_or("unknown").to_string(),
                reason: other.to_string(),
                hook,
            },
        }
    }
}
