//! # Account Scope
//!
//! The asset view handed to untrusted code. Every mutation is made as one
//! account: a scope can spend its own balance, spend allowances granted to
//! it, grant allowances over its own balance, and mint only what it
//! issues. Reads are unrestricted.
//!
//! External protocols are reached through [`AccountScope::enter_protocol`],
//! which rebinds the view to a registered protocol account. Vaults are
//! never protocol accounts, so no chain of scopes can debit a vault except
//! through an allowance the vault granted.

use crate::domain::errors::LedgerError;
use crate::ports::outbound::{AssetReader, AssetTransfer};
use shared_types::{Address, AssetId, U256};

/// Asset operations performed as `account`.
pub struct AccountScope<'a, 'b> {
    assets: &'a mut (dyn AssetTransfer + 'b),
    account: Address,
}

impl<'a, 'b> AccountScope<'a, 'b> {
    /// View of `assets` acting as `account`.
    pub fn new(assets: &'a mut (dyn AssetTransfer + 'b), account: Address) -> Self {
        Self { assets, account }
    }

    /// Account this scope acts as.
    #[must_use]
    pub fn account(&self) -> Address {
        self.account
    }

    /// Move `amount` of `asset` from this account to `to`.
    ///
    /// Returns the amount `to` received.
    pub fn transfer(&mut self, asset: &AssetId, to: &Address, amount: U256) -> Result<U256, LedgerError> {
        self.assets.transfer(asset, &self.account, to, amount)
    }

    /// Spend an allowance `from` granted this account.
    pub fn transfer_from(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        self.assets
            .transfer_from(asset, &self.account, from, to, amount)
    }

    /// Let `spender` move up to `amount` of this account's `asset`.
    pub fn approve(&mut self, asset: &AssetId, spender: &Address, amount: U256) {
        self.assets.approve(asset, &self.account, spender, amount);
    }

    /// Issue `amount` of `asset` to `to`. Only the asset's issuer may.
    pub fn mint(&mut self, asset: &AssetId, to: &Address, amount: U256) -> Result<(), LedgerError> {
        if self.assets.issuer_of(asset) != Some(self.account) {
            return Err(LedgerError::NotIssuer {
                asset: *asset,
                account: self.account,
            });
        }
        self.assets.mint(asset, to, amount)
    }

    /// Destroy `amount` of this account's `asset`.
    pub fn burn(&mut self, asset: &AssetId, amount: U256) -> Result<(), LedgerError> {
        self.assets.burn(asset, &self.account, amount)
    }

    /// Act as the registered protocol account `protocol`.
    pub fn enter_protocol(&mut self, protocol: Address) -> Result<AccountScope<'_, 'b>, LedgerError> {
        if !self.assets.is_protocol(&protocol) {
            return Err(LedgerError::UnknownProtocol(protocol));
        }
        Ok(AccountScope {
            assets: &mut *self.assets,
            account: protocol,
        })
    }
}

impl AssetReader for AccountScope<'_, '_> {
    fn balance_of(&self, asset: &AssetId, account: &Address) -> U256 {
        self.assets.balance_of(asset, account)
    }

    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> U256 {
        self.assets.allowance(asset, owner, spender)
    }

    fn transfer_fee_bps(&self, asset: &AssetId) -> u16 {
        self.assets.transfer_fee_bps(asset)
    }

    fn issuer_of(&self, asset: &AssetId) -> Option<Address> {
        self.assets.issuer_of(asset)
    }

    fn is_protocol(&self, account: &Address) -> bool {
        self.assets.is_protocol(account)
    }
}

impl std::fmt::Debug for AccountScope<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountScope")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}
