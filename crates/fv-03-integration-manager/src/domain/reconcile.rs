//! # Reconciliation
//!
//! Compares vault balances before and after adapter execution against
//! the declared [`AssetPlan`]. Only raw balance deltas are used; nothing
//! the adapter reports is trusted.
//!
//! | Check | Failure |
//! |-------|---------|
//! | incoming balance did not decrease | CustodyViolation |
//! | incoming received >= declared minimum | CustodyViolation |
//! | spent <= declared amount (Transfer / Approve) | CustodyViolation |
//! | nothing spent (None / Remove) | CustodyViolation |

use crate::domain::asset_plan::AssetPlan;
use crate::domain::receipt::AssetAmount;
use crate::errors::IntegrationError;
use fv_01_vault_ledger::AssetReader;
use shared_types::{Address, AssetId, U256};

/// Vault balances of a fixed asset list at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    balances: Vec<(AssetId, U256)>,
}

impl BalanceSnapshot {
    /// Read the vault balance of every asset in `assets`.
    pub fn capture<R: AssetReader + ?Sized>(book: &R, vault: &Address, assets: &[AssetId]) -> Self {
        Self {
            balances: assets
                .iter()
                .map(|asset| (*asset, book.balance_of(asset, vault)))
                .collect(),
        }
    }

    /// Balance of `asset`, zero if it was not captured.
    #[must_use]
    pub fn get(&self, asset: &AssetId) -> U256 {
        self.balances
            .iter()
            .find(|(a, _)| a == asset)
            .map(|(_, b)| *b)
            .unwrap_or_default()
    }
}

/// Actual movements established by reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Declared incoming assets with the amounts received, followed by
    /// spend assets whose balance increased.
    pub incoming: Vec<AssetAmount>,
    /// Spend assets with the amounts spent (zero included).
    pub spent: Vec<AssetAmount>,
}

impl Reconciliation {
    /// Outgoing movements: spend assets not in the incoming set that were
    /// actually spent.
    #[must_use]
    pub fn outgoing(&self) -> Vec<AssetAmount> {
        self.spent
            .iter()
            .filter(|s| !s.amount.is_zero())
            .filter(|s| !self.incoming.iter().any(|i| i.asset == s.asset))
            .copied()
            .collect()
    }

    /// Incoming asset ids.
    #[must_use]
    pub fn incoming_assets(&self) -> Vec<AssetId> {
        self.incoming.iter().map(|i| i.asset).collect()
    }
}

/// Enforce the custody bounds of `plan` on the `pre` / `post` snapshots.
pub fn reconcile(
    plan: &AssetPlan,
    pre: &BalanceSnapshot,
    post: &BalanceSnapshot,
) -> Result<Reconciliation, IntegrationError> {
    let mut result = Reconciliation::default();

    for (asset, min) in plan
        .incoming_assets
        .iter()
        .zip(&plan.min_incoming_asset_amounts)
    {
        let (before, after) = (pre.get(asset), post.get(asset));
        if after < before {
            return Err(IntegrationError::custody(format!(
                "Incoming asset {asset} balance decreased: {before} -> {after}"
            )));
        }
        let received = after - before;
        if received < *min {
            return Err(IntegrationError::custody(format!(
                "Received incoming asset less than expected: {asset} received {received}, minimum {min}"
            )));
        }
        result.incoming.push(AssetAmount::new(*asset, received));
    }

    for (asset, max) in plan.spend_assets.iter().zip(&plan.spend_asset_amounts) {
        if plan.incoming_assets.contains(asset) {
            // Already bounded from below as an incoming asset.
            continue;
        }
        let (before, after) = (pre.get(asset), post.get(asset));
        if after > before {
            result.incoming.push(AssetAmount::new(*asset, after - before));
            result.spent.push(AssetAmount::new(*asset, U256::zero()));
            continue;
        }

        let spent = before - after;
        let allowed = if plan.handle_type.authorizes_spend() {
            *max
        } else {
            U256::zero()
        };
        if spent > allowed {
            return Err(IntegrationError::custody(format!(
                "Spent amount greater than expected: {asset} spent {spent}, allowed {allowed}"
            )));
        }
        result.spent.push(AssetAmount::new(*asset, spent));
    }

    Ok(result)
}
