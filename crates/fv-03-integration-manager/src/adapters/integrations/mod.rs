//! # Reference Integrations
//!
//! Adapters for a handful of external protocol families, each paired with
//! a mock protocol whose entire state lives in the asset book. Rolling the
//! book back therefore rolls the protocol back too.
//!
//! | Adapter | Actions | Handle type |
//! |---------|---------|-------------|
//! | [`LendingAdapter`] | `lend`, `redeem` | Transfer |
//! | [`PoolAdapter`] | `redeem` | Transfer |
//! | [`SwapAdapter`] | `takeOrder` | Approve |
//! | [`RewardsAdapter`] | `claimRewards` | None |
//! | [`TrackedAssetRemovalAdapter`] | `removeTrackedAssets` | Remove |

pub mod lending;
pub mod pool;
pub mod removal;
pub mod rewards;
pub mod swap;

pub use lending::*;
pub use pool::*;
pub use removal::*;
pub use rewards::*;
pub use swap::*;

/// Action selectors understood by the reference adapters.
pub mod selectors {
    use shared_types::Selector;

    /// `lend(address,bytes,bytes)`
    #[must_use]
    pub fn lend() -> Selector {
        Selector::from_signature("lend(address,bytes,bytes)")
    }

    /// `redeem(address,bytes,bytes)`
    #[must_use]
    pub fn redeem() -> Selector {
        Selector::from_signature("redeem(address,bytes,bytes)")
    }

    /// `takeOrder(address,bytes,bytes)`
    #[must_use]
    pub fn take_order() -> Selector {
        Selector::from_signature("takeOrder(address,bytes,bytes)")
    }

    /// `claimRewards(address,bytes,bytes)`
    #[must_use]
    pub fn claim_rewards() -> Selector {
        Selector::from_signature("claimRewards(address,bytes,bytes)")
    }

    /// `removeTrackedAssets(address,bytes,bytes)`
    #[must_use]
    pub fn remove_tracked_assets() -> Selector {
        Selector::from_signature("removeTrackedAssets(address,bytes,bytes)")
    }
}
