//! # Asset Plan
//!
//! What an adapter declares it will do with the vault's assets. Produced
//! by `Adapter::parse_asset_plan` before anything moves.

use crate::errors::IntegrationError;
use serde::{Deserialize, Serialize};
use shared_types::{AssetId, U256};
use std::fmt;

/// How spend assets reach the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpendAssetsHandleType {
    /// Nothing moves and nothing may leave the vault.
    None,
    /// The adapter is granted an allowance of the declared amounts.
    Approve,
    /// The declared amounts are moved to the adapter before execution.
    Transfer,
    /// Nothing moves; spend assets may be dropped from tracking if dust.
    Remove,
}

impl SpendAssetsHandleType {
    /// Whether this handle type authorizes the vault to lose spend assets.
    #[must_use]
    pub fn authorizes_spend(&self) -> bool {
        matches!(self, Self::Approve | Self::Transfer)
    }
}

impl fmt::Display for SpendAssetsHandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Approve => "Approve",
            Self::Transfer => "Transfer",
            Self::Remove => "Remove",
        };
        f.write_str(name)
    }
}

/// Declared intent of one adapter call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPlan {
    /// How spend assets are handed over.
    pub handle_type: SpendAssetsHandleType,
    /// Assets the call may take from the vault.
    pub spend_assets: Vec<AssetId>,
    /// Maximum amounts, parallel to `spend_assets`.
    pub spend_asset_amounts: Vec<U256>,
    /// Assets the call must deliver to the vault.
    pub incoming_assets: Vec<AssetId>,
    /// Minimum amounts, parallel to `incoming_assets`.
    pub min_incoming_asset_amounts: Vec<U256>,
}

impl AssetPlan {
    /// A plan with no spend assets.
    #[must_use]
    pub fn incoming_only(incoming_assets: Vec<AssetId>, min_amounts: Vec<U256>) -> Self {
        Self {
            handle_type: SpendAssetsHandleType::None,
            spend_assets: Vec::new(),
            spend_asset_amounts: Vec::new(),
            incoming_assets,
            min_incoming_asset_amounts: min_amounts,
        }
    }

    /// A plan handing `spend` over with `handle_type`.
    #[must_use]
    pub fn new(
        handle_type: SpendAssetsHandleType,
        spend: Vec<(AssetId, U256)>,
        incoming: Vec<(AssetId, U256)>,
    ) -> Self {
        let (spend_assets, spend_asset_amounts) = spend.into_iter().unzip();
        let (incoming_assets, min_incoming_asset_amounts) = incoming.into_iter().unzip();
        Self {
            handle_type,
            spend_assets,
            spend_asset_amounts,
            incoming_assets,
            min_incoming_asset_amounts,
        }
    }

    /// `spend_assets ∪ incoming_assets`, spend assets first, no duplicates.
    #[must_use]
    pub fn touched_assets(&self) -> Vec<AssetId> {
        let mut assets = self.spend_assets.clone();
        for asset in &self.incoming_assets {
            if !assets.contains(asset) {
                assets.push(*asset);
            }
        }
        assets
    }

    /// Check structural invariants.
    ///
    /// - parallel lists have equal lengths
    /// - no asset appears twice in the same list
    /// - Transfer and Approve spend amounts are positive
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if self.spend_assets.len() != self.spend_asset_amounts.len() {
            return Err(IntegrationError::validation(format!(
                "Spend assets arrays unequal: {} assets, {} amounts",
                self.spend_assets.len(),
                self.spend_asset_amounts.len()
            )));
        }
        if self.incoming_assets.len() != self.min_incoming_asset_amounts.len() {
            return Err(IntegrationError::validation(format!(
                "Incoming assets arrays unequal: {} assets, {} amounts",
                self.incoming_assets.len(),
                self.min_incoming_asset_amounts.len()
            )));
        }
        if let Some(asset) = first_duplicate(&self.spend_assets) {
            return Err(IntegrationError::validation(format!(
                "Duplicate spend asset {asset}"
            )));
        }
        if let Some(asset) = first_duplicate(&self.incoming_assets) {
            return Err(IntegrationError::validation(format!(
                "Duplicate incoming asset {asset}"
            )));
        }
        if self.handle_type.authorizes_spend() {
            let zero = self
                .spend_assets
                .iter()
                .zip(&self.spend_asset_amounts)
                .find(|(_, amount)| amount.is_zero());
            if let Some((asset, _)) = zero {
                return Err(IntegrationError::validation(format!(
                    "Zero spend amount for {asset}"
                )));
            }
        }
        Ok(())
    }
}

fn first_duplicate(assets: &[AssetId]) -> Option<AssetId> {
    assets
        .iter()
        .enumerate()
        .find(|(i, asset)| assets[..*i].contains(*asset))
        .map(|(_, asset)| *asset)
}
