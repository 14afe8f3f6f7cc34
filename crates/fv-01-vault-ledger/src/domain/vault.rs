//! # Vault Ledger
//!
//! Fund-scoped view of custody: which address holds the fund's assets,
//! which asset denominates it, and which assets are tracked.
//!
//! Balances themselves live in the asset book; every balance method takes
//! the book (or a staged overlay of it) explicitly so the same ledger can
//! be driven against live or staged state.

use crate::domain::dust::{DustEvaluation, DustTolerance};
use crate::domain::errors::LedgerError;
use crate::domain::tracked::TrackedAssets;
use crate::ports::outbound::{AssetReader, AssetTransfer, ValueInterpreter};
use serde::{Deserialize, Serialize};
use shared_types::{Address, AssetId, U256};
use tracing::debug;

/// Custody record of one fund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultLedger {
    vault: Address,
    denomination_asset: AssetId,
    tracked: TrackedAssets,
}

impl VaultLedger {
    /// Create a ledger for `vault`. The denomination asset is tracked from
    /// the start.
    #[must_use]
    pub fn new(vault: Address, denomination_asset: AssetId) -> Self {
        let mut tracked = TrackedAssets::new();
        tracked.insert(denomination_asset);
        Self {
            vault,
            denomination_asset,
            tracked,
        }
    }

    /// Address holding the fund's assets.
    #[must_use]
    pub fn vault_address(&self) -> Address {
        self.vault
    }

    /// Asset shares are denominated in.
    #[must_use]
    pub fn denomination_asset(&self) -> AssetId {
        self.denomination_asset
    }

    // =========================================================================
    // BALANCES
    // =========================================================================

    /// Vault balance of `asset`.
    pub fn balance_of<R: AssetReader + ?Sized>(&self, book: &R, asset: &AssetId) -> U256 {
        book.balance_of(asset, &self.vault)
    }

    /// Move `amount` of `asset` from the vault to `to`.
    ///
    /// Returns the amount `to` received.
    pub fn transfer_out<B: AssetTransfer + ?Sized>(
        &self,
        book: &mut B,
        asset: &AssetId,
        to: &Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        book.transfer(asset, &self.vault, to, amount)
    }

    /// Move `amount` of `asset` from `from` into the vault.
    ///
    /// Returns the amount the vault received.
    pub fn transfer_in<B: AssetTransfer + ?Sized>(
        &self,
        book: &mut B,
        asset: &AssetId,
        from: &Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        book.transfer(asset, from, &self.vault, amount)
    }

    /// Grant `spender` an allowance over the vault's `asset`.
    pub fn approve<B: AssetTransfer + ?Sized>(
        &self,
        book: &mut B,
        asset: &AssetId,
        spender: &Address,
        amount: U256,
    ) {
        book.approve(asset, &self.vault, spender, amount);
    }

    /// Allowance the vault currently grants `spender`.
    pub fn allowance<R: AssetReader + ?Sized>(
        &self,
        book: &R,
        asset: &AssetId,
        spender: &Address,
    ) -> U256 {
        book.allowance(asset, &self.vault, spender)
    }

    // =========================================================================
    // TRACKED ASSETS
    // =========================================================================

    /// Tracked assets in insertion order.
    #[must_use]
    pub fn tracked_assets(&self) -> &[AssetId] {
        self.tracked.as_slice()
    }

    /// Whether `asset` is tracked.
    #[must_use]
    pub fn is_tracked(&self, asset: &AssetId) -> bool {
        self.tracked.contains(asset)
    }

    /// Track `asset`, bounded by `limit` entries.
    ///
    /// Returns `true` if the asset was newly added. Re-adding a tracked
    /// asset is a no-op and never hits the limit.
    pub fn add_tracked_asset(&mut self, asset: AssetId, limit: usize) -> Result<bool, LedgerError> {
        if self.tracked.contains(&asset) {
            return Ok(false);
        }
        if self.tracked.len() >= limit {
            return Err(LedgerError::TrackedAssetLimitExceeded { limit });
        }
        self.tracked.insert(asset);
        debug!(vault = %self.vault, asset = %asset, "Tracked asset added");
        Ok(true)
    }

    /// Stop tracking `asset` without any balance check.
    ///
    /// Returns `true` if the asset was tracked. The denomination asset can
    /// never be removed.
    pub fn remove_tracked_asset(&mut self, asset: &AssetId) -> Result<bool, LedgerError> {
        if *asset == self.denomination_asset {
            return Err(LedgerError::CannotRemoveDenominationAsset(*asset));
        }
        let removed = self.tracked.remove(asset);
        if removed {
            debug!(vault = %self.vault, asset = %asset, "Tracked asset removed");
        }
        Ok(removed)
    }

    /// Stop tracking `asset` only if its vault balance is dust.
    ///
    /// Used by manual removal requests: an asset above the tolerance stays
    /// tracked and the request fails.
    pub fn remove_tracked_asset_checked<R: AssetReader + ?Sized>(
        &mut self,
        book: &R,
        asset: &AssetId,
        tolerance: &DustTolerance,
        valuation: Option<&dyn ValueInterpreter>,
    ) -> Result<(), LedgerError> {
        if *asset == self.denomination_asset {
            return Err(LedgerError::CannotRemoveDenominationAsset(*asset));
        }
        if !self.tracked.contains(asset) {
            return Err(LedgerError::NotTracked(*asset));
        }

        let balance = self.balance_of(book, asset);
        match tolerance.evaluate(asset, balance, valuation) {
            DustEvaluation::Within { .. } => {
                self.remove_tracked_asset(asset)?;
                Ok(())
            }
            DustEvaluation::Exceeds { value, threshold } => {
                Err(LedgerError::ExceedsDustThreshold {
                    asset: *asset,
                    value,
                    threshold,
                })
            }
            DustEvaluation::Unpriced => Err(LedgerError::InvalidValuation(*asset)),
        }
    }

    /// Whether the vault's balance of `asset` is dust under `tolerance`.
    ///
    /// An unpriceable balance is not dust.
    pub fn is_dust<R: AssetReader + ?Sized>(
        &self,
        book: &R,
        asset: &AssetId,
        tolerance: &DustTolerance,
        valuation: Option<&dyn ValueInterpreter>,
    ) -> bool {
        tolerance
            .evaluate(asset, self.balance_of(book, asset), valuation)
            .is_dust()
    }
}
