//! # Test Fixtures
//!
//! One shared asset book, one integration manager with the built-in
//! policies, and a couple of funds. Addresses are small integers so test
//! failures stay readable.

use fv_01_vault_ledger::{AccountScope, AssetBook, AssetReader, AssetTransfer, FixedRateValuation};
use fv_02_policy_manager::PolicyManager;
use fv_03_integration_manager::adapters::integrations::{
    LendArgs, LendingAdapter, MockLendingPool,
};
use fv_03_integration_manager::{
    Adapter, AdapterBase, AdapterError, AssetPlan, InMemoryEventLog, IntegrationConfig,
    IntegrationManager,
};
use serde::Serialize;
use shared_types::{encode_args, AdapterId, Address, AssetId, FundId, Selector, U256};
use std::sync::Arc;

// =============================================================================
// ADDRESSES
// =============================================================================

/// Integration manager address, the only caller adapters accept.
pub fn manager_address() -> Address {
    Address::from_low_u64(0x1E)
}

/// Release owner: registers adapters and policies.
pub fn release_owner() -> Address {
    Address::from_low_u64(0x2E)
}

/// Owner of every test fund.
pub fn owner() -> Address {
    Address::from_low_u64(0x0E)
}

/// Nobody in particular.
pub fn stranger() -> Address {
    Address::from_low_u64(0xBAD)
}

/// Fund `n`.
pub fn fund(n: u64) -> FundId {
    FundId::from_low_u64(n)
}

/// Vault of fund `n`.
pub fn vault(n: u64) -> Address {
    Address::from_low_u64(0x7A00 + n)
}

/// Denomination asset.
pub fn usd() -> AssetId {
    Address::from_low_u64(0xD0)
}

/// Asset lent in the reference lending pool ("X").
pub fn x() -> AssetId {
    Address::from_low_u64(0xA)
}

/// Receipt token of the reference lending pool.
pub fn receipt_token() -> AssetId {
    Address::from_low_u64(0xCA)
}

/// A second volatile asset.
pub fn eth() -> AssetId {
    Address::from_low_u64(0xE0)
}

/// Lending adapter address.
pub fn lending() -> AdapterId {
    Address::from_low_u64(0xAD01)
}

/// The reference lending pool.
pub fn lending_pool() -> MockLendingPool {
    MockLendingPool {
        address: Address::from_low_u64(0x9001),
        underlying: x(),
        receipt_token: receipt_token(),
    }
}

/// Prices: 1 USD = 1, 1 X = 2, 1 receipt = 2, 1 ETH = 1000.
pub fn rates() -> FixedRateValuation {
    FixedRateValuation::new()
        .with_rate(usd(), U256::one())
        .with_rate(x(), U256::from(2u64))
        .with_rate(receipt_token(), U256::from(2u64))
        .with_rate(eth(), U256::from(1000u64))
}

/// Encoded `lend` args.
pub fn lend_args(amount: u64, min_receipt: u64) -> Vec<u8> {
    encode_args(&LendArgs {
        amount: U256::from(amount),
        min_receipt_amount: U256::from(min_receipt),
    })
    .unwrap()
    .as_slice()
    .to_vec()
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// A wired-up pipeline.
pub struct Env {
    /// The manager under test.
    pub manager: Arc<IntegrationManager>,
    /// Every committed event.
    pub events: Arc<InMemoryEventLog>,
}

impl Env {
    /// Manager without a price source. Fund 1, the lending pool and the
    /// lending adapter are registered.
    pub fn new() -> Self {
        Self::build(IntegrationConfig::default(), None)
    }

    /// Manager priced by [`rates`].
    pub fn priced(config: IntegrationConfig) -> Self {
        Self::build(config, Some(rates()))
    }

    fn build(config: IntegrationConfig, valuation: Option<FixedRateValuation>) -> Self {
        fv_telemetry::init_test_tracing();

        let events = Arc::new(InMemoryEventLog::new());
        let mut manager = IntegrationManager::new(
            manager_address(),
            release_owner(),
            AssetBook::new().into_shared(),
            Arc::new(PolicyManager::with_builtin_policies()),
            config,
        )
        .with_event_sink(events.clone());
        if let Some(valuation) = valuation {
            manager = manager.with_valuation(Arc::new(valuation));
        }

        let env = Self {
            manager: Arc::new(manager),
            events,
        };
        env.add_fund(1);
        let pool = lending_pool();
        env.protocol(pool.address, &[pool.receipt_token]);
        env.register(Arc::new(LendingAdapter::new(
            lending(),
            manager_address(),
            lending_pool(),
        )));
        env.events.clear();
        env
    }

    /// Register fund `n` owned by [`owner`].
    pub fn add_fund(&self, n: u64) {
        self.manager
            .register_fund(fund(n), owner(), vault(n), usd())
            .unwrap();
    }

    /// Register an adapter as the release owner.
    pub fn register(&self, adapter: Arc<dyn Adapter>) {
        self.manager
            .register_adapter(release_owner(), adapter)
            .unwrap();
    }

    /// Register `protocol` as an external protocol account issuing `issued`.
    pub fn protocol(&self, protocol: Address, issued: &[AssetId]) {
        self.manager
            .register_protocol(release_owner(), protocol, issued)
            .unwrap();
    }

    /// Create tokens out of thin air.
    pub fn mint(&self, asset: AssetId, account: Address, amount: u64) {
        self.manager
            .book()
            .write()
            .mint(&asset, &account, U256::from(amount))
            .unwrap();
    }

    /// Live balance.
    pub fn balance(&self, asset: AssetId, account: Address) -> U256 {
        self.manager.book().read().balance_of(&asset, &account)
    }

    /// Live allowance.
    pub fn allowance(&self, asset: AssetId, owner: Address, spender: Address) -> U256 {
        self.manager.book().read().allowance(&asset, &owner, &spender)
    }

    /// Configure a fee-on-transfer asset.
    pub fn set_fee(&self, asset: AssetId, bps: u16) {
        self.manager.book().write().set_transfer_fee_bps(asset, bps);
    }

    /// Copy of the whole book, for full-state equality checks.
    pub fn snapshot(&self) -> AssetBook {
        self.manager.book().read().clone()
    }

    /// Enable a policy on fund `n` with `settings` as its JSON document.
    pub fn enable<T: Serialize>(&self, n: u64, policy: &str, settings: &T) {
        self.manager
            .enable_policy(owner(), fund(n), policy, &serde_json::to_vec(settings).unwrap())
            .unwrap();
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SCRIPTED ADAPTER
// =============================================================================

/// Address hostile adapters drain to.
pub fn attacker() -> Address {
    Address::from_low_u64(0xEE11)
}

/// Selector scripted adapters answer to.
pub fn scripted_selector() -> Selector {
    Selector::new([0xEE, 0, 0, 0])
}

type Script = dyn Fn(&mut AccountScope<'_, '_>, &Address, &Address) -> Result<(), AdapterError>
    + Send
    + Sync;

/// Adapter that declares a fixed plan and runs an arbitrary script.
///
/// The script gets the adapter's account scope, the vault and the
/// adapter's own address, and may do anything the scope allows.
pub struct ScriptedAdapter {
    base: AdapterBase,
    plan: AssetPlan,
    script: Box<Script>,
}

impl ScriptedAdapter {
    /// Scripted adapter at `address`.
    pub fn new<F>(address: AdapterId, plan: AssetPlan, script: F) -> Self
    where
        F: Fn(&mut AccountScope<'_, '_>, &Address, &Address) -> Result<(), AdapterError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            base: AdapterBase::new(address, manager_address()),
            plan,
            script: Box::new(script),
        }
    }
}

impl Adapter for ScriptedAdapter {
    fn identifier(&self) -> &'static str {
        "SCRIPTED"
    }

    fn address(&self) -> AdapterId {
        self.base.address
    }

    fn parse_asset_plan(
        &self,
        _vault: Address,
        _selector: Selector,
        _args: &[u8],
    ) -> Result<AssetPlan, AdapterError> {
        Ok(self.plan.clone())
    }

    fn execute(
        &self,
        caller: Address,
        assets: &mut AccountScope<'_, '_>,
        vault: Address,
        _selector: Selector,
        _args: &[u8],
    ) -> Result<(), AdapterError> {
        self.base.ensure_integration_manager(&caller)?;
        (self.script)(assets, &vault, &self.base.address)
    }
}
