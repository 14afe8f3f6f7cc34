//! # Staged Book
//!
//! Write overlay over the shared [`AssetBook`]. A pipeline stages every
//! mutation here and either commits the whole set or drops the overlay.
//!
//! The live book is only locked for the duration of a single read or of
//! the final commit, never while an adapter runs. Balances are committed
//! as deltas against the value first observed, so stages of different
//! funds that touch the same external account (a shared lending pool, a
//! DEX) compose instead of overwriting each other.

use crate::adapters::asset_book::{AllowanceKey, AssetBook, BalanceDelta, BalanceKey, BookChanges};
use crate::domain::errors::LedgerError;
use crate::ports::outbound::{AssetReader, AssetTransfer};
use parking_lot::RwLock;
use shared_types::{Address, AssetId, U256};
use std::collections::HashMap;
use tracing::debug;

/// Pending mutations on top of a live book.
///
/// Dropping a `StagedBook` without calling [`StagedBook::commit`] discards
/// every staged mutation.
pub struct StagedBook<'a> {
    base: &'a RwLock<AssetBook>,
    balances: HashMap<BalanceKey, U256>,
    base_reads: HashMap<BalanceKey, U256>,
    balance_order: Vec<BalanceKey>,
    allowances: HashMap<AllowanceKey, U256>,
    allowance_order: Vec<AllowanceKey>,
}

impl<'a> StagedBook<'a> {
    /// Start an empty stage over `base`.
    #[must_use]
    pub fn new(base: &'a RwLock<AssetBook>) -> Self {
        Self {
            base,
            balances: HashMap::new(),
            base_reads: HashMap::new(),
            balance_order: Vec::new(),
            allowances: HashMap::new(),
            allowance_order: Vec::new(),
        }
    }

    /// Number of balance entries written so far.
    #[must_use]
    pub fn touched_balances(&self) -> usize {
        self.balance_order.len()
    }

    /// Drop any staged write to an allowance, restoring the live value.
    pub fn revert_allowance(&mut self, asset: &AssetId, owner: &Address, spender: &Address) {
        let key = (*asset, *owner, *spender);
        if self.allowances.remove(&key).is_some() {
            self.allowance_order.retain(|k| *k != key);
        }
    }

    /// Allowance entries written by this stage whose owner is `owner`.
    #[must_use]
    pub fn staged_allowances_of(&self, owner: &Address) -> Vec<AllowanceKey> {
        self.allowance_order
            .iter()
            .filter(|(_, o, _)| o == owner)
            .copied()
            .collect()
    }

    /// Net changes relative to the values this stage observed.
    #[must_use]
    pub fn changes(&self) -> BookChanges {
        let mut balance_deltas = Vec::new();
        for key in &self.balance_order {
            let staged = self.balances.get(key).copied().unwrap_or_default();
            let observed = self.base_reads.get(key).copied().unwrap_or_default();
            if staged > observed {
                balance_deltas.push((*key, BalanceDelta::Credit(staged - observed)));
            } else if staged < observed {
                balance_deltas.push((*key, BalanceDelta::Debit(observed - staged)));
            }
        }

        let allowances = self
            .allowance_order
            .iter()
            .map(|key| (*key, self.allowances.get(key).copied().unwrap_or_default()))
            .collect();

        BookChanges {
            balance_deltas,
            allowances,
        }
    }

    /// Apply the staged changes to the live book under one write lock.
    ///
    /// Fails with [`LedgerError::CommitConflict`] if a concurrent commit
    /// drained a balance this stage debits; the live book is then left
    /// untouched.
    pub fn commit(self) -> Result<BookChanges, LedgerError> {
        let changes = self.changes();
        if changes.is_empty() {
            return Ok(changes);
        }
        self.base.write().apply(&changes)?;
        debug!(
            balances = changes.balance_deltas.len(),
            allowances = changes.allowances.len(),
            "Staged book committed"
        );
        Ok(changes)
    }
}

impl AssetReader for StagedBook<'_> {
    fn balance_of(&self, asset: &AssetId, account: &Address) -> U256 {
        match self.balances.get(&(*asset, *account)) {
            Some(staged) => *staged,
            None => self.base.read().balance_of(asset, account),
        }
    }

    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> U256 {
        match self.allowances.get(&(*asset, *owner, *spender)) {
            Some(staged) => *staged,
            None => self.base.read().allowance(asset, owner, spender),
        }
    }

    fn transfer_fee_bps(&self, asset: &AssetId) -> u16 {
        self.base.read().transfer_fee_bps(asset)
    }

    fn issuer_of(&self, asset: &AssetId) -> Option<Address> {
        self.base.read().issuer_of(asset)
    }

    fn is_protocol(&self, account: &Address) -> bool {
        self.base.read().is_protocol(account)
    }
}

impl AssetTransfer for StagedBook<'_> {
    fn set_balance(&mut self, asset: &AssetId, account: &Address, amount: U256) {
        let key = (*asset, *account);
        if !self.base_reads.contains_key(&key) {
            let observed = self.base.read().balance_of(asset, account);
            self.base_reads.insert(key, observed);
            self.balance_order.push(key);
        }
        self.balances.insert(key, amount);
    }

    fn set_allowance(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: U256) {
        let key = (*asset, *owner, *spender);
        if self.allowances.insert(key, amount).is_none() {
            self.allowance_order.push(key);
        }
    }
}
