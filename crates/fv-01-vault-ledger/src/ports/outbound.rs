//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the ledger depends on:
//! - The token substrate that holds balances and allowances
//! - The valuation collaborator used for dust tolerance

use crate::domain::errors::LedgerError;
use shared_types::{Address, AssetId, U256};

// =============================================================================
// TOKEN SUBSTRATE
// =============================================================================

/// Read access to token balances.
pub trait AssetReader {
    /// Balance of `asset` held by `account` (zero if never credited).
    fn balance_of(&self, asset: &AssetId, account: &Address) -> U256;

    /// Remaining allowance `owner` granted `spender` for `asset`.
    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> U256;

    /// Transfer fee charged by `asset` in basis points (fee-on-transfer
    /// tokens). The fee is burned from the transferred amount.
    fn transfer_fee_bps(&self, _asset: &AssetId) -> u16 {
        0
    }

    /// Protocol account allowed to mint and burn `asset`, if any.
    fn issuer_of(&self, _asset: &AssetId) -> Option<Address> {
        None
    }

    /// Whether `account` is a registered external protocol.
    fn is_protocol(&self, _account: &Address) -> bool {
        false
    }
}

/// Unrestricted write access to token balances.
///
/// Every debit is checked against the current balance, but no sender is
/// checked: this is the ledger's own substrate. Adapters only ever see it
/// through an [`crate::AccountScope`].
pub trait AssetTransfer: AssetReader {
    /// Overwrite a balance. Building block for every other mutation.
    fn set_balance(&mut self, asset: &AssetId, account: &Address, amount: U256);

    /// Overwrite an allowance.
    fn set_allowance(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: U256);

    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// Returns the amount `to` actually received, which is lower than
    /// `amount` for fee-on-transfer assets.
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: *asset,
                account: *from,
                required: amount,
                available,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(amount);
        }

        let fee = fee_for(amount, self.transfer_fee_bps(asset));
        let received = amount - fee;

        let to_balance = self
            .balance_of(asset, to)
            .checked_add(received)
            .ok_or(LedgerError::Overflow {
                asset: *asset,
                account: *to,
            })?;

        self.set_balance(asset, from, available - amount);
        self.set_balance(asset, to, to_balance);
        Ok(received)
    }

    /// Grant `spender` an allowance of exactly `amount`.
    fn approve(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: U256) {
        self.set_allowance(asset, owner, spender, amount);
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset: *asset,
                owner: *from,
                spender: *spender,
                required: amount,
                available: allowed,
            });
        }
        let received = self.transfer(asset, from, to, amount)?;
        self.set_allowance(asset, from, spender, allowed - amount);
        Ok(received)
    }

    /// Create `amount` of `asset` out of thin air (protocol-issued tokens).
    fn mint(&mut self, asset: &AssetId, to: &Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                asset: *asset,
                account: *to,
            })?;
        self.set_balance(asset, to, balance);
        Ok(())
    }

    /// Destroy `amount` of `asset` held by `from`.
    fn burn(&mut self, asset: &AssetId, from: &Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: *asset,
                account: *from,
                required: amount,
                available,
            });
        }
        self.set_balance(asset, from, available - amount);
        Ok(())
    }
}

/// Fee withheld from `amount` at `bps` basis points (rounded down).
#[must_use]
pub fn fee_for(amount: U256, bps: u16) -> U256 {
    if bps == 0 {
        return U256::zero();
    }
    let bps = U256::from(bps.min(10_000));
    // amount * bps cannot overflow for amount < 2^242; fall back to divide-first.
    match amount.checked_mul(bps) {
        Some(product) => product / U256::from(10_000u64),
        None => amount / U256::from(10_000u64) * bps,
    }
}

// =============================================================================
// VALUATION COLLABORATOR
// =============================================================================

/// Prices assets in terms of a reference asset.
///
/// Consumed by dust tolerance checks and by policies. Reconciliation never
/// consults it: custody is enforced on raw balance deltas.
pub trait ValueInterpreter: Send + Sync {
    /// Value of `amount` of `asset`, expressed in `reference_asset`.
    ///
    /// Returns `(value, is_valid)`; an invalid price must not be trusted.
    fn price_of(&self, asset: &AssetId, amount: U256, reference_asset: &AssetId) -> (U256, bool);

    /// Whether the interpreter can price `asset` at all.
    fn is_supported_asset(&self, asset: &AssetId) -> bool;
}
