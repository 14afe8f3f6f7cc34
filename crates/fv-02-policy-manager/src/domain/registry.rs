//! Release-wide registry of available policies.

use crate::domain::errors::PolicyError;
use crate::ports::outbound::Policy;
use std::sync::Arc;

/// Policies a fund may enable, in registration order.
#[derive(Default, Clone)]
pub struct PolicyRegistry {
    policies: Vec<Arc<dyn Policy>>,
}

impl PolicyRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `policy`. Identifiers are unique.
    pub fn register(&mut self, policy: Arc<dyn Policy>) -> Result<(), PolicyError> {
        let identifier = policy.identifier();
        if self.contains(identifier) {
            return Err(PolicyError::AlreadyRegistered(identifier.to_string()));
        }
        self.policies.push(policy);
        Ok(())
    }

    /// Remove a policy. Funds that already enabled it keep evaluating it.
    pub fn deregister(&mut self, identifier: &str) -> Result<Arc<dyn Policy>, PolicyError> {
        let index = self
            .policies
            .iter()
            .position(|p| p.identifier() == identifier)
            .ok_or_else(|| PolicyError::NotRegistered(identifier.to_string()))?;
        Ok(self.policies.remove(index))
    }

    /// Look up a policy.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Policy>> {
        self.policies
            .iter()
            .find(|p| p.identifier() == identifier)
            .cloned()
    }

    /// Whether `identifier` is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.policies.iter().any(|p| p.identifier() == identifier)
    }

    /// Registered identifiers in registration order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.identifier()).collect()
    }

    /// Number of registered policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.identifiers()).finish()
    }
}
