//! # Policy Hooks
//!
//! The vocabulary shared by hook callers (the integration manager, the
//! share issuance flow) and policies.
//!
//! A hook is a `(HookKind, Timing)` pair. Every policy declares the set of
//! pairs it implements; the policy manager only consults a policy when
//! the fired pair is in that set.

use crate::entities::{AdapterId, Address, AssetId, Selector, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hook families a policy can attach to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HookKind {
    /// An adapter call through the integration manager.
    CallOnIntegration,
    /// A share purchase.
    BuyShares,
    /// A share redemption.
    RedeemShares,
    /// Manual addition of tracked assets.
    AddTrackedAssets,
    /// Manual removal of tracked assets.
    RemoveTrackedAssets,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CallOnIntegration => "CallOnIntegration",
            Self::BuyShares => "BuyShares",
            Self::RedeemShares => "RedeemShares",
            Self::AddTrackedAssets => "AddTrackedAssets",
            Self::RemoveTrackedAssets => "RemoveTrackedAssets",
        };
        f.write_str(name)
    }
}

/// When a hook fires relative to the action it guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timing {
    /// Before any asset moves.
    Pre,
    /// After the action, before commit.
    Post,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => f.write_str("Pre"),
            Self::Post => f.write_str("Post"),
        }
    }
}

/// A concrete hook point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyHook {
    /// Hook family.
    pub kind: HookKind,
    /// Pre or post.
    pub timing: Timing,
}

impl PolicyHook {
    /// `PreCallOnIntegration`.
    pub const PRE_CALL_ON_INTEGRATION: Self = Self::new(HookKind::CallOnIntegration, Timing::Pre);
    /// `PostCallOnIntegration`.
    pub const POST_CALL_ON_INTEGRATION: Self =
        Self::new(HookKind::CallOnIntegration, Timing::Post);
    /// `PreBuyShares`.
    pub const PRE_BUY_SHARES: Self = Self::new(HookKind::BuyShares, Timing::Pre);
    /// `PostBuyShares`.
    pub const POST_BUY_SHARES: Self = Self::new(HookKind::BuyShares, Timing::Post);
    /// `PreRedeemShares`.
    pub const PRE_REDEEM_SHARES: Self = Self::new(HookKind::RedeemShares, Timing::Pre);
    /// `PostAddTrackedAssets`.
    pub const POST_ADD_TRACKED_ASSETS: Self =
        Self::new(HookKind::AddTrackedAssets, Timing::Post);
    /// `PostRemoveTrackedAssets`.
    pub const POST_REMOVE_TRACKED_ASSETS: Self =
        Self::new(HookKind::RemoveTrackedAssets, Timing::Post);

    /// Creates a hook point.
    #[must_use]
    pub const fn new(kind: HookKind, timing: Timing) -> Self {
        Self { kind, timing }
    }
}

impl fmt::Display for PolicyHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.timing, self.kind)
    }
}

// =============================================================================
// HOOK CONTEXT
// =============================================================================

/// Data handed to policies when a hook fires.
///
/// For `CallOnIntegration` the pre hook carries the *declared* plan
/// (spend assets as outgoing, minimum incoming amounts as incoming) and
/// the post hook carries the *actual* reconciled movements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookContext {
    /// Adapter call.
    CallOnIntegration {
        /// Fund manager that initiated the call.
        caller: Address,
        /// Adapter being called.
        adapter: AdapterId,
        /// Action selector.
        selector: Selector,
        /// Assets entering the vault.
        incoming_assets: Vec<AssetId>,
        /// Amounts parallel to `incoming_assets`.
        incoming_asset_amounts: Vec<U256>,
        /// Assets leaving the vault.
        outgoing_assets: Vec<AssetId>,
        /// Amounts parallel to `outgoing_assets`.
        outgoing_asset_amounts: Vec<U256>,
    },
    /// Share purchase.
    BuyShares {
        /// Account submitting the purchase (a wrapper may buy on behalf of
        /// `buyer`).
        caller: Address,
        /// Account receiving the shares.
        buyer: Address,
        /// Denomination-asset amount invested.
        investment_amount: U256,
        /// Minimum shares the buyer accepts.
        min_shares_quantity: U256,
    },
    /// Share redemption.
    RedeemShares {
        /// Account redeeming shares.
        redeemer: Address,
        /// Shares redeemed.
        shares_quantity: U256,
    },
    /// Manual tracked asset change (add or remove).
    TrackedAssets {
        /// Fund manager performing the change.
        caller: Address,
        /// Assets added or removed.
        assets: Vec<AssetId>,
    },
}

impl HookContext {
    /// The hook family this context belongs to, where it is unambiguous.
    ///
    /// `TrackedAssets` serves both add and remove hooks, so it yields
    /// `None`.
    #[must_use]
    pub fn kind(&self) -> Option<HookKind> {
        match self {
            Self::CallOnIntegration { .. } => Some(HookKind::CallOnIntegration),
            Self::BuyShares { .. } => Some(HookKind::BuyShares),
            Self::RedeemShares { .. } => Some(HookKind::RedeemShares),
            Self::TrackedAssets { .. } => None,
        }
    }

    /// Incoming assets of a call-on-integration context, empty otherwise.
    #[must_use]
    pub fn incoming_assets(&self) -> &[AssetId] {
        match self {
            Self::CallOnIntegration {
                incoming_assets, ..
            } => incoming_assets,
            _ => &[],
        }
    }

    /// Outgoing assets of a call-on-integration context, empty otherwise.
    #[must_use]
    pub fn outgoing_assets(&self) -> &[AssetId] {
        match self {
            Self::CallOnIntegration {
                outgoing_assets, ..
            } => outgoing_assets,
            _ => &[],
        }
    }

    /// Whether this context may be dispatched under `kind`.
    #[must_use]
    pub fn matches(&self, kind: HookKind) -> bool {
        match self {
            Self::TrackedAssets { .. } => matches!(
                kind,
                HookKind::AddTrackedAssets | HookKind::RemoveTrackedAssets
            ),
            other => other.kind() == Some(kind),
        }
    }
}
