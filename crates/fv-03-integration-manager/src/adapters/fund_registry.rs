//! In-memory fund store.

use crate::domain::fund::Fund;
use parking_lot::RwLock;
use shared_types::{Address, FundId};
use std::collections::HashMap;
use std::sync::Arc;

/// Handle to one fund.
pub type FundHandle = Arc<RwLock<Fund>>;

/// Funds known to the integration manager.
#[derive(Default, Debug)]
pub struct FundRegistry {
    funds: RwLock<HashMap<FundId, FundHandle>>,
}

impl FundRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `fund`. Returns `false` if its id is taken.
    pub fn insert(&self, fund: Fund) -> bool {
        let mut funds = self.funds.write();
        if funds.contains_key(&fund.id()) {
            return false;
        }
        funds.insert(fund.id(), Arc::new(RwLock::new(fund)));
        true
    }

    /// Look up a fund.
    #[must_use]
    pub fn get(&self, id: &FundId) -> Option<FundHandle> {
        self.funds.read().get(id).cloned()
    }

    /// Whether some registered fund keeps its assets at `vault`.
    #[must_use]
    pub fn holds_vault(&self, vault: &Address) -> bool {
        self.funds
            .read()
            .values()
            .any(|fund| fund.read().ledger().vault_address() == *vault)
    }

    /// Number of funds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.funds.read().len()
    }

    /// True if there are no funds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.funds.read().is_empty()
    }
}
