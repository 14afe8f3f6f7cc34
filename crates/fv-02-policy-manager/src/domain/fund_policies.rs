//! Policies enabled for one fund.

use crate::domain::config::PolicyConfig;
use crate::ports::outbound::Policy;
use std::sync::Arc;

/// A policy enabled for a fund together with its settings.
#[derive(Clone)]
pub struct EnabledPolicy {
    /// The policy implementation.
    pub policy: Arc<dyn Policy>,
    /// Settings stored at enable time (or last update).
    pub config: PolicyConfig,
}

impl std::fmt::Debug for EnabledPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnabledPolicy")
            .field("policy", &self.policy.identifier())
            .field("config", &self.config)
            .finish()
    }
}

/// Enabled policies of one fund, in enable order.
///
/// Owned by the fund entity; only the policy manager mutates it.
#[derive(Clone, Debug, Default)]
pub struct FundPolicies {
    entries: Vec<EnabledPolicy>,
}

impl FundPolicies {
    /// No policies enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `identifier` is enabled.
    #[must_use]
    pub fn is_enabled(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Entry for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&EnabledPolicy> {
        self.entries
            .iter()
            .find(|e| e.policy.identifier() == identifier)
    }

    /// Enabled identifiers in enable order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.policy.identifier()).collect()
    }

    /// Iterate entries in enable order.
    pub fn iter(&self) -> impl Iterator<Item = &EnabledPolicy> {
        self.entries.iter()
    }

    /// Number of enabled policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: EnabledPolicy) {
        self.entries.push(entry);
    }

    pub(crate) fn get_mut(&mut self, identifier: &str) -> Option<&mut EnabledPolicy> {
        self.entries
            .iter_mut()
            .find(|e| e.policy.identifier() == identifier)
    }

    pub(crate) fn remove(&mut self, identifier: &str) -> Option<EnabledPolicy> {
        let index = self
            .entries
            .iter()
            .position(|e| e.policy.identifier() == identifier)?;
        Some(self.entries.remove(index))
    }
}
