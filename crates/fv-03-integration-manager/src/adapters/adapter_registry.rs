//! Adapters callable in this release.

use crate::ports::outbound::Adapter;
use shared_types::AdapterId;
use std::collections::HashMap;
use std::sync::Arc;

/// Registered adapters keyed by address.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<AdapterId, Arc<dyn Adapter>>,
    order: Vec<AdapterId>,
}

impl AdapterRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter`. Returns `false` if its address is taken.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) -> bool {
        let address = adapter.address();
        if self.adapters.contains_key(&address) {
            return false;
        }
        self.adapters.insert(address, adapter);
        self.order.push(address);
        true
    }

    /// Remove an adapter. Returns it if it was registered.
    pub fn deregister(&mut self, address: &AdapterId) -> Option<Arc<dyn Adapter>> {
        let adapter = self.adapters.remove(address)?;
        self.order.retain(|a| a != address);
        Some(adapter)
    }

    /// Resolve an adapter.
    #[must_use]
    pub fn get(&self, address: &AdapterId) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(address).cloned()
    }

    /// Registered addresses in registration order.
    #[must_use]
    pub fn addresses(&self) -> Vec<AdapterId> {
        self.order.clone()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.order.iter().filter_map(|a| {
                self.adapters
                    .get(a)
                    .map(|adapter| (adapter.identifier(), *a))
            }))
            .finish()
    }
}
