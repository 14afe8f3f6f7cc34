//! # Fund Entity
//!
//! Owns every fund-scoped piece of mutable state: the access list, the
//! vault ledger (tracked assets) and the enabled policies. The pipeline
//! works on copies and swaps them in at commit.

use fv_01_vault_ledger::VaultLedger;
use fv_02_policy_manager::FundPolicies;
use shared_types::{Address, AssetId, FundId};

/// A fund and its vault.
#[derive(Clone, Debug)]
pub struct Fund {
    id: FundId,
    owner: Address,
    asset_managers: Vec<Address>,
    ledger: VaultLedger,
    policies: FundPolicies,
}

impl Fund {
    /// Create a fund whose vault holds `denomination_asset`.
    #[must_use]
    pub fn new(id: FundId, owner: Address, vault: Address, denomination_asset: AssetId) -> Self {
        Self {
            id,
            owner,
            asset_managers: Vec::new(),
            ledger: VaultLedger::new(vault, denomination_asset),
            policies: FundPolicies::new(),
        }
    }

    /// Fund identifier.
    #[must_use]
    pub fn id(&self) -> FundId {
        self.id
    }

    /// Fund owner.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Whether `account` owns the fund.
    #[must_use]
    pub fn is_owner(&self, account: &Address) -> bool {
        self.owner == *account
    }

    /// Whether `account` may act on the vault's assets.
    #[must_use]
    pub fn is_authorized(&self, account: &Address) -> bool {
        self.is_owner(account) || self.asset_managers.contains(account)
    }

    /// Asset managers in the order they were added.
    #[must_use]
    pub fn asset_managers(&self) -> &[Address] {
        &self.asset_managers
    }

    /// Grant manager rights. Returns `false` if already a manager.
    pub fn add_asset_manager(&mut self, manager: Address) -> bool {
        if self.asset_managers.contains(&manager) {
            return false;
        }
        self.asset_managers.push(manager);
        true
    }

    /// Revoke manager rights. Returns `false` if not a manager.
    pub fn remove_asset_manager(&mut self, manager: &Address) -> bool {
        let before = self.asset_managers.len();
        self.asset_managers.retain(|m| m != manager);
        self.asset_managers.len() != before
    }

    /// Vault ledger.
    #[must_use]
    pub fn ledger(&self) -> &VaultLedger {
        &self.ledger
    }

    /// Swap in a ledger produced by a committed pipeline.
    pub fn replace_ledger(&mut self, ledger: VaultLedger) {
        self.ledger = ledger;
    }

    /// Enabled policies.
    #[must_use]
    pub fn policies(&self) -> &FundPolicies {
        &self.policies
    }

    /// Enabled policies, for the policy manager.
    pub fn policies_mut(&mut self) -> &mut FundPolicies {
        &mut self.policies
    }
}
