//! # Asset Book
//!
//! In-memory token substrate shared by every account: vaults, adapters and
//! external protocols. Production deployments would back the same ports
//! with on-chain token contracts.

use crate::domain::errors::LedgerError;
use crate::ports::outbound::{AssetReader, AssetTransfer};
use parking_lot::RwLock;
use shared_types::{Address, AssetId, U256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Key of a balance entry.
pub type BalanceKey = (AssetId, Address);

/// Key of an allowance entry: (asset, owner, spender).
pub type AllowanceKey = (AssetId, Address, Address);

/// Token balances, allowances, per-asset transfer fees and the registry of
/// external protocol accounts.
///
/// Zero balances and allowances are never stored, so two books holding
/// the same economic state compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBook {
    balances: HashMap<BalanceKey, U256>,
    allowances: HashMap<AllowanceKey, U256>,
    transfer_fees_bps: HashMap<AssetId, u16>,
    protocols: HashSet<Address>,
    issuers: HashMap<AssetId, Address>,
}

/// Book shared between pipelines of distinct funds.
pub type SharedAssetBook = Arc<RwLock<AssetBook>>;

impl AssetBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the book for sharing across pipelines.
    #[must_use]
    pub fn into_shared(self) -> SharedAssetBook {
        Arc::new(RwLock::new(self))
    }

    /// Configure a fee-on-transfer asset.
    pub fn set_transfer_fee_bps(&mut self, asset: AssetId, bps: u16) {
        if bps == 0 {
            self.transfer_fees_bps.remove(&asset);
        } else {
            self.transfer_fees_bps.insert(asset, bps.min(10_000));
        }
    }

    /// Register `protocol` as an external protocol account that issues
    /// `issued`.
    ///
    /// Adapters may act as a registered protocol; only the issuer of an
    /// asset may mint it. Re-registering adds issued assets.
    pub fn register_protocol(&mut self, protocol: Address, issued: &[AssetId]) {
        self.protocols.insert(protocol);
        for asset in issued {
            self.issuers.insert(*asset, protocol);
        }
    }

    /// Number of non-zero balance entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.balances.len()
    }

    /// Apply a staged change set atomically.
    ///
    /// Every balance delta is validated against the current balance before
    /// anything is written; on error the book is untouched.
    pub fn apply(&mut self, changes: &BookChanges) -> Result<(), LedgerError> {
        let mut resolved = Vec::with_capacity(changes.balance_deltas.len());
        for (key, delta) in &changes.balance_deltas {
            let current = self.balances.get(key).copied().unwrap_or_default();
            let next = match delta {
                BalanceDelta::Credit(amount) => current.checked_add(*amount).ok_or(
                    LedgerError::Overflow {
                        asset: key.0,
                        account: key.1,
                    },
                )?,
                BalanceDelta::Debit(amount) => current.checked_sub(*amount).ok_or(
                    LedgerError::CommitConflict {
                        asset: key.0,
                        account: key.1,
                    },
                )?,
            };
            resolved.push((*key, next));
        }

        for (key, value) in resolved {
            self.set_balance(&key.0, &key.1, value);
        }
        for (key, value) in &changes.allowances {
            self.set_allowance(&key.0, &key.1, &key.2, *value);
        }
        Ok(())
    }
}

impl AssetReader for AssetBook {
    fn balance_of(&self, asset: &AssetId, account: &Address) -> U256 {
        self.balances
            .get(&(*asset, *account))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer_fee_bps(&self, asset: &AssetId) -> u16 {
        self.transfer_fees_bps.get(asset).copied().unwrap_or(0)
    }

    fn issuer_of(&self, asset: &AssetId) -> Option<Address> {
        self.issuers.get(asset).copied()
    }

    fn is_protocol(&self, account: &Address) -> bool {
        self.protocols.contains(account)
    }
}

impl AssetTransfer for AssetBook {
    fn set_balance(&mut self, asset: &AssetId, account: &Address, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(&(*asset, *account));
        } else {
            self.balances.insert((*asset, *account), amount);
        }
    }

    fn set_allowance(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: U256) {
        if amount.is_zero() {
            self.allowances.remove(&(*asset, *owner, *spender));
        } else {
            self.allowances.insert((*asset, *owner, *spender), amount);
        }
    }
}

// =============================================================================
// CHANGE SET
// =============================================================================

/// Signed balance change relative to the value a stage first observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceDelta {
    /// Balance increased by the amount.
    Credit(U256),
    /// Balance decreased by the amount.
    Debit(U256),
}

/// Mutations produced by a [`crate::StagedBook`].
///
/// Balances are carried as deltas so that commits of independent funds
/// touching the same external account compose. Allowances are absolute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookChanges {
    /// Balance deltas, in first-touch order.
    pub balance_deltas: Vec<(BalanceKey, BalanceDelta)>,
    /// Final allowance values.
    pub allowances: Vec<(AllowanceKey, U256)>,
}

impl BookChanges {
    /// True when the stage wrote nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balance_deltas.is_empty() && self.allowances.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
