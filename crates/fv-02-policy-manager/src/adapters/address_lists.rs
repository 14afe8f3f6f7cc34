//! # Address List Policies
//!
//! Allow-list and deny-list rules over the addresses a hook context
//! carries: incoming assets, the adapter, the buyer or the buy-shares
//! caller. All built-in list policies are instances of
//! [`AddressListPolicy`] with a different subject, mode and capability set.

use crate::domain::config::{decode_settings, PolicyConfig};
use crate::domain::errors::PolicyError;
use crate::ports::outbound::{Policy, RuleContext};
use serde::{Deserialize, Serialize};
use shared_types::{Address, FundId, HookContext, PolicyHook};
use tracing::debug;

/// Settings of a list policy: the listed addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressListSettings {
    /// Listed addresses.
    pub addresses: Vec<Address>,
}

/// Update document for updatable list policies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressListUpdate {
    /// Addresses to add.
    #[serde(default)]
    pub add: Vec<Address>,
    /// Addresses to remove.
    #[serde(default)]
    pub remove: Vec<Address>,
}

/// What the list is matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListSubject {
    /// Incoming assets of a call, or the assets of a manual tracked asset
    /// change.
    Assets,
    /// The adapter of a call.
    Adapter,
    /// The account receiving shares.
    Buyer,
    /// The account submitting a share purchase.
    BuySharesCaller,
}

/// Whether listed addresses are the only ones allowed or the ones denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMode {
    /// Every subject must be listed.
    Allow,
    /// No subject may be listed.
    Deny,
}

/// A list-based policy.
#[derive(Clone, Debug)]
pub struct AddressListPolicy {
    identifier: &'static str,
    subject: ListSubject,
    mode: ListMode,
    hooks: Vec<PolicyHook>,
    updatable: bool,
    disableable: bool,
}

impl AddressListPolicy {
    /// `ASSET_BLACKLIST`: calls may not bring in listed assets and listed
    /// assets may not be tracked manually.
    #[must_use]
    pub fn asset_blacklist() -> Self {
        Self {
            identifier: "ASSET_BLACKLIST",
            subject: ListSubject::Assets,
            mode: ListMode::Deny,
            hooks: vec![
                PolicyHook::POST_CALL_ON_INTEGRATION,
                PolicyHook::POST_ADD_TRACKED_ASSETS,
            ],
            updatable: false,
            disableable: false,
        }
    }

    /// `ASSET_WHITELIST`: only listed assets may come in or be tracked.
    #[must_use]
    pub fn asset_whitelist() -> Self {
        Self {
            identifier: "ASSET_WHITELIST",
            mode: ListMode::Allow,
            ..Self::asset_blacklist()
        }
    }

    /// `ADAPTER_BLACKLIST`: listed adapters may not be called.
    #[must_use]
    pub fn adapter_blacklist() -> Self {
        Self {
            identifier: "ADAPTER_BLACKLIST",
            subject: ListSubject::Adapter,
            mode: ListMode::Deny,
            hooks: vec![PolicyHook::PRE_CALL_ON_INTEGRATION],
            updatable: false,
            disableable: false,
        }
    }

    /// `ADAPTER_WHITELIST`: only listed adapters may be called.
    #[must_use]
    pub fn adapter_whitelist() -> Self {
        Self {
            identifier: "ADAPTER_WHITELIST",
            mode: ListMode::Allow,
            ..Self::adapter_blacklist()
        }
    }

    /// `INVESTOR_WHITELIST`: only listed accounts may receive shares.
    #[must_use]
    pub fn investor_whitelist() -> Self {
        Self {
            identifier: "INVESTOR_WHITELIST",
            subject: ListSubject::Buyer,
            mode: ListMode::Allow,
            hooks: vec![PolicyHook::PRE_BUY_SHARES],
            updatable: true,
            disableable: true,
        }
    }

    /// `BUY_SHARES_CALLER_WHITELIST`: only listed accounts may submit
    /// share purchases.
    #[must_use]
    pub fn buy_shares_caller_whitelist() -> Self {
        Self {
            identifier: "BUY_SHARES_CALLER_WHITELIST",
            subject: ListSubject::BuySharesCaller,
            mode: ListMode::Allow,
            hooks: vec![PolicyHook::PRE_BUY_SHARES],
            updatable: false,
            disableable: true,
        }
    }

    /// Matched subject.
    #[must_use]
    pub fn subject(&self) -> ListSubject {
        self.subject
    }

    /// Allow or deny.
    #[must_use]
    pub fn mode(&self) -> ListMode {
        self.mode
    }

    fn subjects(&self, context: &HookContext) -> Vec<Address> {
        match (self.subject, context) {
            (ListSubject::Assets, HookContext::CallOnIntegration { incoming_assets, .. }) => {
                incoming_assets.clone()
            }
            (ListSubject::Assets, HookContext::TrackedAssets { assets, .. }) => assets.clone(),
            (ListSubject::Adapter, HookContext::CallOnIntegration { adapter, .. }) => {
                vec![*adapter]
            }
            (ListSubject::Buyer, HookContext::BuyShares { buyer, .. }) => vec![*buyer],
            (ListSubject::BuySharesCaller, HookContext::BuyShares { caller, .. }) => vec![*caller],
            _ => Vec::new(),
        }
    }
}

impl Policy for AddressListPolicy {
    fn identifier(&self) -> &'static str {
        self.identifier
    }

    fn implemented_hooks(&self) -> Vec<PolicyHook> {
        self.hooks.clone()
    }

    fn add_fund_settings(&self, fund: FundId, config: &[u8]) -> Result<PolicyConfig, PolicyError> {
        let mut settings: AddressListSettings = decode_settings(self.identifier, config)?;
        dedup_preserving_order(&mut settings.addresses);
        debug!(
            policy = self.identifier,
            fund = %fund,
            listed = settings.addresses.len(),
            "List policy settings added"
        );
        PolicyConfig::from_settings(self.identifier, &settings)
    }

    fn is_updatable(&self) -> bool {
        self.updatable
    }

    fn update_fund_settings(
        &self,
        fund: FundId,
        current: &PolicyConfig,
        config: &[u8],
    ) -> Result<PolicyConfig, PolicyError> {
        if !self.updatable {
            return Err(PolicyError::NotUpdatable(self.identifier.to_string()));
        }
        let update: AddressListUpdate = decode_settings(self.identifier, config)?;
        let mut settings: AddressListSettings = current.settings(self.identifier)?;

        settings.addresses.retain(|a| !update.remove.contains(a));
        settings.addresses.extend(update.add);
        dedup_preserving_order(&mut settings.addresses);

        debug!(
            policy = self.identifier,
            fund = %fund,
            listed = settings.addresses.len(),
            "List policy settings updated"
        );
        PolicyConfig::from_settings(self.identifier, &settings)
    }

    fn can_disable(&self) -> bool {
        self.disableable
    }

    fn validate_rule(
        &self,
        _ctx: &RuleContext<'_>,
        settings: &PolicyConfig,
        _hook: PolicyHook,
        context: &HookContext,
    ) -> Result<bool, PolicyError> {
        let settings: AddressListSettings = settings.settings(self.identifier)?;
        let subjects = self.subjects(context);

        let passes = match self.mode {
            ListMode::Allow => subjects.iter().all(|s| settings.addresses.contains(s)),
            ListMode::Deny => !subjects.iter().any(|s| settings.addresses.contains(s)),
        };
        Ok(passes)
    }
}

fn dedup_preserving_order(addresses: &mut Vec<Address>) {
    let mut seen = Vec::with_capacity(addresses.len());
    addresses.retain(|a| {
        if seen.contains(a) {
            false
        } else {
            seen.push(*a);
            true
        }
    });
}
