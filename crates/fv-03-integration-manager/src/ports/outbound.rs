//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the integration manager depends on:
//! - Adapters, one per external protocol / action family
//! - The sink committed events are published to

use crate::domain::asset_plan::AssetPlan;
use crate::events::IntegrationEvent;
use fv_01_vault_ledger::{AccountScope, LedgerError};
use shared_types::{AdapterId, Address, CodecError, Selector};
use thiserror::Error;

// =============================================================================
// ADAPTER
// =============================================================================

/// Errors raised by adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("selector invalid: {0}")]
    InvalidSelector(Selector),

    #[error("Only the IntegrationManager can call this function")]
    UnauthorizedCaller(Address),

    #[error("Malformed call args: {0}")]
    MalformedArgs(String),

    #[error("Asset movement failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<CodecError> for AdapterError {
    fn from(err: CodecError) -> Self {
        Self::MalformedArgs(err.to_string())
    }
}

/// A pluggable translator and executor for one external protocol.
///
/// `parse_asset_plan` is pure: it reads nothing but its arguments and
/// yields the same plan for the same input. `execute` performs the
/// external interaction and must refuse any caller other than the
/// integration manager. It acts as the adapter's own account: vault
/// assets are reachable only as transferred to it or through the
/// allowance granted for the call.
pub trait Adapter: Send + Sync {
    /// Human-readable identifier.
    fn identifier(&self) -> &'static str;

    /// Address the adapter holds assets at; also its registry key.
    fn address(&self) -> AdapterId;

    /// Declare what `selector` with `args` will do with the vault's assets.
    fn parse_asset_plan(
        &self,
        vault: Address,
        selector: Selector,
        args: &[u8],
    ) -> Result<AssetPlan, AdapterError>;

    /// Perform the action.
    fn execute(
        &self,
        caller: Address,
        assets: &mut AccountScope<'_, '_>,
        vault: Address,
        selector: Selector,
        args: &[u8],
    ) -> Result<(), AdapterError>;
}

/// Common adapter state: own address and the only permitted caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterBase {
    /// Adapter address.
    pub address: AdapterId,
    /// Integration manager address.
    pub integration_manager: Address,
}

impl AdapterBase {
    /// Adapter at `address`, callable by `integration_manager`.
    #[must_use]
    pub fn new(address: AdapterId, integration_manager: Address) -> Self {
        Self {
            address,
            integration_manager,
        }
    }

    /// Reject callers other than the integration manager.
    pub fn ensure_integration_manager(&self, caller: &Address) -> Result<(), AdapterError> {
        if *caller != self.integration_manager {
            return Err(AdapterError::UnauthorizedCaller(*caller));
        }
        Ok(())
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Receives committed events.
pub trait EventSink: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: IntegrationEvent);
}
