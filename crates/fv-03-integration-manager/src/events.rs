//! # Integration Events
//!
//! Published through the [`crate::EventSink`] port after a successful
//! commit. A rolled-back operation publishes nothing.

use serde::{Deserialize, Serialize};
use shared_types::{AdapterId, Address, AssetId, FundId, Selector};
use uuid::Uuid;

/// Events emitted by the integration manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationEvent {
    /// An adapter call committed.
    CallOnIntegrationExecuted {
        /// Receipt correlation id.
        correlation_id: Uuid,
        /// Fund.
        fund: FundId,
        /// Manager who made the call.
        caller: Address,
        /// Adapter called.
        adapter: AdapterId,
        /// Action selector.
        selector: Selector,
        /// Assets that entered the vault.
        incoming_assets: Vec<AssetId>,
        /// Assets that left the vault.
        outgoing_assets: Vec<AssetId>,
    },
    /// An asset started being tracked.
    TrackedAssetAdded {
        /// Fund.
        fund: FundId,
        /// Asset.
        asset: AssetId,
    },
    /// An asset stopped being tracked.
    TrackedAssetRemoved {
        /// Fund.
        fund: FundId,
        /// Asset.
        asset: AssetId,
    },
    /// The owner granted manager rights.
    AssetManagerAdded {
        /// Fund.
        fund: FundId,
        /// New manager.
        manager: Address,
    },
    /// The owner revoked manager rights.
    AssetManagerRemoved {
        /// Fund.
        fund: FundId,
        /// Former manager.
        manager: Address,
    },
    /// A policy was enabled for a fund.
    PolicyEnabled {
        /// Fund.
        fund: FundId,
        /// Policy identifier.
        policy: String,
    },
    /// Settings of an enabled policy changed.
    PolicySettingsUpdated {
        /// Fund.
        fund: FundId,
        /// Policy identifier.
        policy: String,
    },
    /// A policy was disabled for a fund.
    PolicyDisabled {
        /// Fund.
        fund: FundId,
        /// Policy identifier.
        policy: String,
    },
    /// An adapter became callable.
    AdapterRegistered {
        /// Adapter address.
        adapter: AdapterId,
        /// Adapter identifier.
        identifier: String,
    },
    /// An adapter stopped being callable.
    AdapterDeregistered {
        /// Adapter address.
        adapter: AdapterId,
    },
    /// An external protocol account was registered.
    ProtocolRegistered {
        /// Protocol account.
        protocol: Address,
        /// Assets the protocol issues.
        issued: Vec<AssetId>,
    },
    /// A fund was registered with the manager.
    FundRegistered {
        /// Fund.
        fund: FundId,
        /// Owner.
        owner: Address,
        /// Vault address.
        vault: Address,
    },
}

impl IntegrationEvent {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CallOnIntegrationExecuted { .. } => "CallOnIntegrationExecuted",
            Self::TrackedAssetAdded { .. } => "TrackedAssetAdded",
            Self::TrackedAssetRemoved { .. } => "TrackedAssetRemoved",
            Self::AssetManagerAdded { .. } => "AssetManagerAdded",
            Self::AssetManagerRemoved { .. } => "AssetManagerRemoved",
            Self::PolicyEnabled { .. } => "PolicyEnabled",
            Self::PolicySettingsUpdated { .. } => "PolicySettingsUpdated",
            Self::PolicyDisabled { .. } => "PolicyDisabled",
            Self::AdapterRegistered { .. } => "AdapterRegistered",
            Self::AdapterDeregistered { .. } => "AdapterDeregistered",
            Self::ProtocolRegistered { .. } => "ProtocolRegistered",
            Self::FundRegistered { .. } => "FundRegistered",
        }
    }

    /// Fund the event concerns, if any.
    #[must_use]
    pub fn fund(&self) -> Option<FundId> {
        match self {
            Self::CallOnIntegrationExecuted { fund, .. }
            | Self::TrackedAssetAdded { fund, .. }
            | Self::TrackedAssetRemoved { fund, .. }
            | Self::AssetManagerAdded { fund, .. }
            | Self::AssetManagerRemoved { fund, .. }
            | Self::PolicyEnabled { fund, .. }
            | Self::PolicySettingsUpdated { fund, .. }
            | Self::PolicyDisabled { fund, .. }
            | Self::FundRegistered { fund, .. } => Some(*fund),
            Self::AdapterRegistered { .. }
            | Self::AdapterDeregistered { .. }
            | Self::ProtocolRegistered { .. } => None,
        }
    }
}
