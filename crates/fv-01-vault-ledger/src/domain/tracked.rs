//! Ordered set of tracked assets.

use serde::{Deserialize, Serialize};
use shared_types::AssetId;

/// Default upper bound on the number of tracked assets per vault.
pub const DEFAULT_MAX_TRACKED_ASSETS: usize = 20;

/// Assets counted toward a fund's holdings, in insertion order.
///
/// A plain `Vec` keeps iteration deterministic; the set is small enough
/// that linear membership checks are cheaper than hashing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAssets {
    assets: Vec<AssetId>,
}

impl TrackedAssets {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `asset` is tracked.
    #[must_use]
    pub fn contains(&self, asset: &AssetId) -> bool {
        self.assets.contains(asset)
    }

    /// Insert `asset`. Returns `false` if it was already present.
    pub fn insert(&mut self, asset: AssetId) -> bool {
        if self.contains(&asset) {
            return false;
        }
        self.assets.push(asset);
        true
    }

    /// Remove `asset`, preserving the order of the rest.
    pub fn remove(&mut self, asset: &AssetId) -> bool {
        match self.assets.iter().position(|a| a == asset) {
            Some(index) => {
                self.assets.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of tracked assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Tracked assets in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[AssetId] {
        &self.assets
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetId> {
        self.assets.iter()
    }
}
