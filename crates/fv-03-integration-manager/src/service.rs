//! # Integration Manager Service
//!
//! Runs adapter calls for funds as all-or-nothing pipelines and owns the
//! release-wide registries (adapters, funds) plus the per-fund in-flight
//! guard.
//!
//! ## Pipeline
//!
//! ```text
//! guard -> auth -> resolve -> parse -> pre-hook -> snapshot -> move
//!       -> execute -> sweep -> snapshot -> reconcile -> tracked set
//!       -> post-hook -> commit
//! ```
//!
//! Every asset mutation from `move` onwards lands in a [`StagedBook`]; the
//! adapter sees it only through an [`AccountScope`] bound to its own
//! address. The tracked set is updated on a copy of the fund's ledger. Nothing is
//! visible to other callers until the final commit, and any error simply
//! drops both.

use crate::adapters::{
    AdapterRegistry, FundHandle, FundLocks, FundRegistry, InFlightGuard, TracingEventSink,
};
use crate::config::IntegrationConfig;
use crate::domain::asset_plan::{AssetPlan, SpendAssetsHandleType};
use crate::domain::fund::Fund;
use crate::domain::receipt::{AssetAmount, Receipt};
use crate::domain::reconcile::{reconcile, BalanceSnapshot, Reconciliation};
use crate::errors::{ErrorKind, IntegrationError};
use crate::events::IntegrationEvent;
use crate::metrics;
use crate::ports::outbound::{Adapter, EventSink};
use fv_01_vault_ledger::{
    AccountScope, AssetReader, BalanceDelta, DustTolerance, SharedAssetBook, StagedBook,
    ValueInterpreter, VaultLedger,
};
use fv_02_policy_manager::{FundPolicies, Policy, PolicyManager, RuleContext};
use parking_lot::{Mutex, RwLock};
use shared_types::{
    AdapterId, Address, AssetId, FundId, HookContext, PolicyHook, Selector, U256,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Statistics for the Integration Manager.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Calls attempted.
    pub calls_executed: u64,
    /// Calls committed.
    pub successful_calls: u64,
    /// Calls rolled back.
    pub failed_calls: u64,
    /// Rejected before any movement (bad adapter, selector, plan).
    pub validation_failures: u64,
    /// Reconciliation failures.
    pub custody_violations: u64,
    /// Rules that evaluated to false.
    pub policy_rejections: u64,
    /// Adapter execution failures.
    pub external_call_failures: u64,
    /// Callers without rights on the fund.
    pub unauthorized_requests: u64,
    /// Operations refused because the fund was busy.
    pub reentrancy_rejections: u64,
    /// Assets the pipeline started tracking.
    pub tracked_assets_added: u64,
    /// Assets the pipeline stopped tracking.
    pub tracked_assets_removed: u64,
    /// Average call duration in microseconds.
    pub avg_execution_time_us: u64,
}

impl ServiceStats {
    fn record_failure(&mut self, kind: ErrorKind) {
        self.failed_calls += 1;
        match kind {
            ErrorKind::Validation => self.validation_failures += 1,
            ErrorKind::CustodyViolation => self.custody_violations += 1,
            ErrorKind::PolicyRejection => self.policy_rejections += 1,
            ErrorKind::ExternalCallFailure => self.external_call_failures += 1,
            ErrorKind::Unauthorized => self.unauthorized_requests += 1,
            ErrorKind::Reentrancy => self.reentrancy_rejections += 1,
        }
    }
}

/// State a successful pipeline hands to the commit step.
struct StagedCall {
    ledger: VaultLedger,
    plan: AssetPlan,
    reconciliation: Reconciliation,
    added: Vec<AssetId>,
    removed: Vec<AssetId>,
}

/// The Integration Manager.
pub struct IntegrationManager {
    address: Address,
    release_owner: Address,
    config: RwLock<IntegrationConfig>,
    book: SharedAssetBook,
    adapters: RwLock<AdapterRegistry>,
    policy_manager: Arc<PolicyManager>,
    funds: FundRegistry,
    in_flight: FundLocks,
    valuation: Option<Arc<dyn ValueInterpreter>>,
    events: Arc<dyn EventSink>,
    stats: Mutex<ServiceStats>,
}

impl IntegrationManager {
    /// Create a manager at `address` administered by `release_owner`.
    ///
    /// `book` is the asset substrate shared with every vault, adapter and
    /// external protocol.
    pub fn new(
        address: Address,
        release_owner: Address,
        book: SharedAssetBook,
        policy_manager: Arc<PolicyManager>,
        config: IntegrationConfig,
    ) -> Self {
        info!(
            address = %address,
            max_tracked_assets = config.max_tracked_assets,
            "Integration manager created"
        );
        Self {
            address,
            release_owner,
            config: RwLock::new(config),
            book,
            adapters: RwLock::new(AdapterRegistry::new()),
            policy_manager,
            funds: FundRegistry::new(),
            in_flight: FundLocks::new(),
            valuation: None,
            events: Arc::new(TracingEventSink),
            stats: Mutex::new(ServiceStats::default()),
        }
    }

    /// Builder: price source for dust checks, receivability and policies.
    #[must_use]
    pub fn with_valuation(mut self, valuation: Arc<dyn ValueInterpreter>) -> Self {
        self.valuation = Some(valuation);
        self
    }

    /// Builder: where committed events go.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Address adapters must see as their caller.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> IntegrationConfig {
        self.config.read().clone()
    }

    /// Shared asset book.
    #[must_use]
    pub fn book(&self) -> SharedAssetBook {
        Arc::clone(&self.book)
    }

    /// Policy manager consulted by every hook.
    #[must_use]
    pub fn policy_manager(&self) -> &Arc<PolicyManager> {
        &self.policy_manager
    }

    /// Snapshot of the service counters.
    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }

    // =========================================================================
    // RELEASE ADMINISTRATION
    // =========================================================================

    fn ensure_release_owner(
        &self,
        caller: &Address,
        action: &'static str,
    ) -> Result<(), IntegrationError> {
        if *caller != self.release_owner {
            warn!(caller = %caller, action, "Unauthorized release action");
            return Err(IntegrationError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Make `adapter` callable by every fund.
    pub fn register_adapter(
        &self,
        caller: Address,
        adapter: Arc<dyn Adapter>,
    ) -> Result<(), IntegrationError> {
        self.ensure_release_owner(&caller, "register adapters")?;
        let address = adapter.address();
        let identifier = adapter.identifier();
        if !self.adapters.write().register(adapter) {
            return Err(IntegrationError::validation(format!(
                "Adapter already registered: {address}"
            )));
        }
        info!(adapter = %address, identifier, "Adapter registered");
        self.events.publish(IntegrationEvent::AdapterRegistered {
            adapter: address,
            identifier: identifier.to_string(),
        });
        Ok(())
    }

    /// Stop routing calls to `adapter`.
    pub fn deregister_adapter(
        &self,
        caller: Address,
        adapter: &AdapterId,
    ) -> Result<(), IntegrationError> {
        self.ensure_release_owner(&caller, "deregister adapters")?;
        if self.adapters.write().deregister(adapter).is_none() {
            return Err(IntegrationError::validation(format!(
                "Adapter is not registered: {adapter}"
            )));
        }
        info!(adapter = %adapter, "Adapter deregistered");
        self.events
            .publish(IntegrationEvent::AdapterDeregistered { adapter: *adapter });
        Ok(())
    }

    /// Registered adapter addresses in registration order.
    #[must_use]
    pub fn registered_adapters(&self) -> Vec<AdapterId> {
        self.adapters.read().addresses()
    }

    /// Make `policy` available to funds.
    pub fn register_policy(
        &self,
        caller: Address,
        policy: Arc<dyn Policy>,
    ) -> Result<(), IntegrationError> {
        self.ensure_release_owner(&caller, "register policies")?;
        self.policy_manager
            .register_policy(policy)
            .map_err(IntegrationError::validation)
    }

    /// Withdraw a policy from the registry. Funds that enabled it keep it.
    pub fn deregister_policy(&self, caller: Address, identifier: &str) -> Result<(), IntegrationError> {
        self.ensure_release_owner(&caller, "deregister policies")?;
        self.policy_manager
            .deregister_policy(identifier)
            .map_err(IntegrationError::validation)
    }

    /// Change the dust tolerance used by removal checks.
    pub fn set_dust_tolerance(
        &self,
        caller: Address,
        tolerance: DustTolerance,
    ) -> Result<(), IntegrationError> {
        self.ensure_release_owner(&caller, "set the dust tolerance")?;
        info!(tolerance = ?tolerance, "Dust tolerance updated");
        self.config.write().dust_tolerance = tolerance;
        Ok(())
    }

    /// Register `protocol` as an external protocol account issuing
    /// `issued`. Adapters may act as it; a fund vault may never be one.
    pub fn register_protocol(
        &self,
        caller: Address,
        protocol: Address,
        issued: &[AssetId],
    ) -> Result<(), IntegrationError> {
        self.ensure_release_owner(&caller, "register protocols")?;
        if protocol.is_zero() || self.funds.holds_vault(&protocol) {
            return Err(IntegrationError::validation(format!(
                "Protocol account is a vault or zero: {protocol}"
            )));
        }
        self.book.write().register_protocol(protocol, issued);
        info!(protocol = %protocol, issued = issued.len(), "Protocol registered");
        self.events.publish(IntegrationEvent::ProtocolRegistered {
            protocol,
            issued: issued.to_vec(),
        });
        Ok(())
    }

    // =========================================================================
    // FUND ADMINISTRATION
    // =========================================================================

    /// Register a fund whose vault lives at `vault`.
    pub fn register_fund(
        &self,
        id: FundId,
        owner: Address,
        vault: Address,
        denomination_asset: AssetId,
    ) -> Result<(), IntegrationError> {
        if vault.is_zero() || denomination_asset.is_zero() {
            return Err(IntegrationError::validation(
                "Vault and denomination asset must be non-zero",
            ));
        }
        if self.book.read().is_protocol(&vault) {
            return Err(IntegrationError::validation(format!(
                "Vault is a protocol account: {vault}"
            )));
        }
        if !self
            .funds
            .insert(Fund::new(id, owner, vault, denomination_asset))
        {
            return Err(IntegrationError::validation(format!(
                "Fund already registered: {id}"
            )));
        }
        info!(fund = %id, owner = %owner, vault = %vault, "Fund registered");
        self.events.publish(IntegrationEvent::FundRegistered {
            fund: id,
            owner,
            vault,
        });
        Ok(())
    }

    fn fund_handle(&self, fund: &FundId) -> Result<FundHandle, IntegrationError> {
        self.funds
            .get(fund)
            .ok_or_else(|| IntegrationError::validation(format!("Unknown fund: {fund}")))
    }

    fn enter(&self, fund: FundId) -> Result<InFlightGuard<'_>, IntegrationError> {
        self.in_flight.try_enter(fund).ok_or_else(|| {
            warn!(fund = %fund, "Operation rejected: fund has an operation in flight");
            IntegrationError::Reentrancy(fund)
        })
    }

    fn ensure_owner(
        fund: &Fund,
        caller: &Address,
        action: &'static str,
    ) -> Result<(), IntegrationError> {
        if !fund.is_owner(caller) {
            return Err(IntegrationError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    fn ensure_authorized(
        fund: &Fund,
        caller: &Address,
        action: &'static str,
    ) -> Result<(), IntegrationError> {
        if !fund.is_authorized(caller) {
            return Err(IntegrationError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Grant manager rights on `fund`. Owner only; all or nothing.
    pub fn add_asset_managers(
        &self,
        caller: Address,
        fund: FundId,
        managers: &[Address],
    ) -> Result<(), IntegrationError> {
        let _guard = self.enter(fund)?;
        let handle = self.fund_handle(&fund)?;
        let mut state = handle.write();
        Self::ensure_owner(&state, &caller, "add asset managers")?;

        for (i, manager) in managers.iter().enumerate() {
            if state.is_owner(manager) {
                return Err(IntegrationError::validation(format!(
                    "Manager {manager} is the fund owner"
                )));
            }
            if state.asset_managers().contains(manager) || managers[..i].contains(manager) {
                return Err(IntegrationError::validation(format!(
                    "Manager already registered: {manager}"
                )));
            }
        }

        for manager in managers {
            state.add_asset_manager(*manager);
        }
        drop(state);

        for manager in managers {
            info!(fund = %fund, manager = %manager, "Asset manager added");
            self.events.publish(IntegrationEvent::AssetManagerAdded {
                fund,
                manager: *manager,
            });
        }
        Ok(())
    }

    /// Revoke manager rights on `fund`. Owner only; all or nothing.
    pub fn remove_asset_managers(
        &self,
        caller: Address,
        fund: FundId,
        managers: &[Address],
    ) -> Result<(), IntegrationError> {
        let _guard = self.enter(fund)?;
        let handle = self.fund_handle(&fund)?;
        let mut state = handle.write();
        Self::ensure_owner(&state, &caller, "remove asset managers")?;

        if let Some(missing) = managers
            .iter()
            .find(|m| !state.asset_managers().contains(*m))
        {
            return Err(IntegrationError::validation(format!(
                "Manager not registered: {missing}"
            )));
        }

        let removed: Vec<Address> = managers
            .iter()
            .filter(|m| state.remove_asset_manager(m))
            .copied()
            .collect();
        drop(state);

        for manager in removed {
            info!(fund = %fund, manager = %manager, "Asset manager removed");
            self.events
                .publish(IntegrationEvent::AssetManagerRemoved { fund, manager });
        }
        Ok(())
    }

    /// Enable a registered policy for `fund`. Owner only.
    pub fn enable_policy(
        &self,
        caller: Address,
        fund: FundId,
        policy: &str,
        settings: &[u8],
    ) -> Result<(), IntegrationError> {
        self.with_fund_policies(caller, fund, "enable policies", |manager, policies| {
            manager.enable_policy(fund, policies, policy, settings)
        })?;
        self.events.publish(IntegrationEvent::PolicyEnabled {
            fund,
            policy: policy.to_string(),
        });
        Ok(())
    }

    /// Replace the settings of an updatable policy. Owner only.
    pub fn update_policy_settings(
        &self,
        caller: Address,
        fund: FundId,
        policy: &str,
        settings: &[u8],
    ) -> Result<(), IntegrationError> {
        self.with_fund_policies(caller, fund, "update policy settings", |manager, policies| {
            manager.update_policy_settings(fund, policies, policy, settings)
        })?;
        self.events.publish(IntegrationEvent::PolicySettingsUpdated {
            fund,
            policy: policy.to_string(),
        });
        Ok(())
    }

    /// Disable a policy that allows it. Owner only.
    pub fn disable_policy(
        &self,
        caller: Address,
        fund: FundId,
        policy: &str,
    ) -> Result<(), IntegrationError> {
        self.with_fund_policies(caller, fund, "disable policies", |manager, policies| {
            manager.disable_policy(fund, policies, policy)
        })?;
        self.events.publish(IntegrationEvent::PolicyDisabled {
            fund,
            policy: policy.to_string(),
        });
        Ok(())
    }

    fn with_fund_policies<F>(
        &self,
        caller: Address,
        fund: FundId,
        action: &'static str,
        f: F,
    ) -> Result<(), IntegrationError>
    where
        F: FnOnce(&PolicyManager, &mut FundPolicies) -> Result<(), fv_02_policy_manager::PolicyError>,
    {
        let _guard = self.enter(fund)?;
        let handle = self.fund_handle(&fund)?;
        let mut state = handle.write();
        Self::ensure_owner(&state, &caller, action)?;
        f(&self.policy_manager, state.policies_mut()).map_err(IntegrationError::validation)
    }

    /// Policies enabled for `fund`, in enable order.
    pub fn enabled_policies(&self, fund: &FundId) -> Result<Vec<&'static str>, IntegrationError> {
        Ok(self.fund_handle(fund)?.read().policies().identifiers())
    }

    /// Whether `account` may act for `fund`.
    pub fn is_authorized(&self, fund: &FundId, account: &Address) -> Result<bool, IntegrationError> {
        Ok(self.fund_handle(fund)?.read().is_authorized(account))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Tracked assets of `fund`, in insertion order.
    pub fn tracked_assets(&self, fund: &FundId) -> Result<Vec<AssetId>, IntegrationError> {
        Ok(self.fund_handle(fund)?.read().ledger().tracked_assets().to_vec())
    }

    /// Vault address of `fund`.
    pub fn vault_of(&self, fund: &FundId) -> Result<Address, IntegrationError> {
        Ok(self.fund_handle(fund)?.read().ledger().vault_address())
    }

    /// Committed vault balance of `asset`.
    pub fn vault_balance(&self, fund: &FundId, asset: &AssetId) -> Result<U256, IntegrationError> {
        let ledger = self.fund_handle(fund)?.read().ledger().clone();
        Ok(ledger.balance_of(&*self.book.read(), asset))
    }

    // =========================================================================
    // HOOKS FOR SHARE FLOWS
    // =========================================================================

    /// Evaluate `fund`'s policies for a hook fired outside this manager
    /// (share purchases and redemptions).
    pub fn validate_policies(
        &self,
        fund: &FundId,
        hook: PolicyHook,
        context: &HookContext,
    ) -> Result<(), IntegrationError> {
        let (ledger, policies) = {
            let handle = self.fund_handle(fund)?;
            let state = handle.read();
            (state.ledger().clone(), state.policies().clone())
        };
        let book = self.book.read();
        self.run_hook(*fund, &ledger, &policies, &*book, hook, context)
    }

    fn run_hook(
        &self,
        fund: FundId,
        ledger: &VaultLedger,
        policies: &FundPolicies,
        assets: &dyn AssetReader,
        hook: PolicyHook,
        context: &HookContext,
    ) -> Result<(), IntegrationError> {
        let ctx = RuleContext {
            fund,
            vault: ledger.vault_address(),
            denomination_asset: ledger.denomination_asset(),
            tracked_assets: ledger.tracked_assets(),
            assets,
            valuation: self.valuation.as_deref(),
        };
        self.policy_manager
            .validate_hook(policies, &ctx, hook, context)
            .map_err(|e| IntegrationError::from_policy(hook, e))
    }

    // =========================================================================
    // CALL ON INTEGRATION
    // =========================================================================

    /// Execute `selector` on `adapter` for `fund`.
    ///
    /// Either every effect (balances, allowances, tracked assets) commits
    /// and a [`Receipt`] is returned, or nothing does.
    #[instrument(skip(self, args), fields(fund = %fund, adapter = %adapter, selector = %selector))]
    pub fn call_on_integration(
        &self,
        caller: Address,
        fund: FundId,
        adapter: AdapterId,
        selector: Selector,
        args: &[u8],
    ) -> Result<Receipt, IntegrationError> {
        let started = Instant::now();
        metrics::record_call();

        let result = self.run_call(caller, fund, adapter, selector, args);

        let elapsed_us = started.elapsed().as_micros() as u64;
        let mut stats = self.stats.lock();
        stats.calls_executed += 1;
        let total = stats.calls_executed;
        stats.avg_execution_time_us = (stats.avg_execution_time_us * (total - 1) + elapsed_us) / total;
        match &result {
            Ok(receipt) => {
                stats.successful_calls += 1;
                stats.tracked_assets_added += receipt.tracked_assets_added.len() as u64;
                stats.tracked_assets_removed += receipt.tracked_assets_removed.len() as u64;
                metrics::record_commit();
                metrics::record_tracked_asset_changes(
                    receipt.tracked_assets_added.len(),
                    receipt.tracked_assets_removed.len(),
                );
            }
            Err(err) => {
                stats.record_failure(err.kind());
                metrics::record_failure(err.kind().as_str());
                if let Some(policy) = err.rejecting_policy() {
                    metrics::record_policy_rejection(policy);
                }
                warn!(kind = err.kind().as_str(), error = %err, "Call on integration rolled back");
            }
        }
        result
    }

    fn run_call(
        &self,
        caller: Address,
        fund: FundId,
        adapter: AdapterId,
        selector: Selector,
        args: &[u8],
    ) -> Result<Receipt, IntegrationError> {
        let _guard = self.enter(fund)?;
        let handle = self.fund_handle(&fund)?;
        let (ledger, policies) = {
            let state = handle.read();
            Self::ensure_authorized(&state, &caller, "call on integration")?;
            (state.ledger().clone(), state.policies().clone())
        };

        let adapter_impl = self.adapters.read().get(&adapter).ok_or_else(|| {
            IntegrationError::validation(format!("Adapter is not registered: {adapter}"))
        })?;
        let plan = adapter_impl
            .parse_asset_plan(ledger.vault_address(), selector, args)
            .map_err(IntegrationError::validation)?;
        plan.validate()?;

        let config = self.config.read().clone();
        self.ensure_receivable(&config, &plan.incoming_assets)?;

        let pre_context = HookContext::CallOnIntegration {
            caller,
            adapter,
            selector,
            incoming_assets: plan.incoming_assets.clone(),
            incoming_asset_amounts: plan.min_incoming_asset_amounts.clone(),
            outgoing_assets: plan.spend_assets.clone(),
            outgoing_asset_amounts: plan.spend_asset_amounts.clone(),
        };

        let mut stage = StagedBook::new(&self.book);
        self.run_hook(
            fund,
            &ledger,
            &policies,
            &stage,
            PolicyHook::PRE_CALL_ON_INTEGRATION,
            &pre_context,
        )?;

        let staged = self.execute_staged(
            &mut stage,
            ledger,
            plan,
            &config,
            adapter_impl.as_ref(),
            selector,
            args,
        )?;

        let reconciliation = &staged.reconciliation;
        let outgoing = reconciliation.outgoing();
        let post_context = HookContext::CallOnIntegration {
            caller,
            adapter,
            selector,
            incoming_assets: reconciliation.incoming_assets(),
            incoming_asset_amounts: reconciliation.incoming.iter().map(|a| a.amount).collect(),
            outgoing_assets: outgoing.iter().map(|a| a.asset).collect(),
            outgoing_asset_amounts: outgoing.iter().map(|a| a.amount).collect(),
        };
        self.run_hook(
            fund,
            &staged.ledger,
            &policies,
            &stage,
            PolicyHook::POST_CALL_ON_INTEGRATION,
            &post_context,
        )?;

        stage
            .commit()
            .map_err(|e| IntegrationError::custody(format!("Commit failed: {e}")))?;
        let StagedCall {
            ledger,
            plan,
            reconciliation,
            added,
            removed,
        } = staged;
        handle.write().replace_ledger(ledger);

        let receipt = Receipt {
            correlation_id: Uuid::new_v4(),
            fund,
            adapter,
            selector,
            handle_type: plan.handle_type,
            declared_incoming: zip_amounts(&plan.incoming_assets, &plan.min_incoming_asset_amounts),
            declared_spend: zip_amounts(&plan.spend_assets, &plan.spend_asset_amounts),
            actual_incoming: reconciliation.incoming.clone(),
            actual_spend: reconciliation.spent.clone(),
            tracked_assets_added: added,
            tracked_assets_removed: removed,
        };
        self.publish_call(caller, &receipt, &outgoing);

        info!(
            correlation_id = %receipt.correlation_id,
            incoming = receipt.actual_incoming.len(),
            spent = receipt.actual_spend.len(),
            "Call on integration committed"
        );
        Ok(receipt)
    }

    /// Steps from asset movement through the tracked set update, all on
    /// `stage` and an owned copy of the ledger.
    #[allow(clippy::too_many_arguments)]
    fn execute_staged(
        &self,
        stage: &mut StagedBook<'_>,
        mut ledger: VaultLedger,
        plan: AssetPlan,
        config: &IntegrationConfig,
        adapter: &dyn Adapter,
        selector: Selector,
        args: &[u8],
    ) -> Result<StagedCall, IntegrationError> {
        let vault = ledger.vault_address();
        let adapter_address = adapter.address();
        let touched = plan.touched_assets();
        let pre = BalanceSnapshot::capture(&*stage, &vault, &touched);

        match plan.handle_type {
            SpendAssetsHandleType::Transfer => {
                for (asset, amount) in plan.spend_assets.iter().zip(&plan.spend_asset_amounts) {
                    ledger
                        .transfer_out(&mut *stage, asset, &adapter_address, *amount)
                        .map_err(|e| {
                            IntegrationError::validation(format!("Spend asset transfer failed: {e}"))
                        })?;
                }
            }
            SpendAssetsHandleType::Approve => {
                for (asset, amount) in plan.spend_assets.iter().zip(&plan.spend_asset_amounts) {
                    ledger.approve(&mut *stage, asset, &adapter_address, *amount);
                }
            }
            SpendAssetsHandleType::None | SpendAssetsHandleType::Remove => {}
        }

        let mut scope = AccountScope::new(&mut *stage, adapter_address);
        adapter
            .execute(self.address, &mut scope, vault, selector, args)
            .map_err(|e| IntegrationError::ExternalCallFailure {
                adapter: adapter_address,
                reason: e.to_string(),
            })?;

        for asset in &touched {
            let residual = stage.balance_of(asset, &adapter_address);
            if residual.is_zero() {
                continue;
            }
            ledger
                .transfer_in(&mut *stage, asset, &adapter_address, residual)
                .map_err(|e| IntegrationError::custody(format!("Sweep of {asset} failed: {e}")))?;
            debug!(asset = %asset, amount = %residual, "Residual swept to vault");
        }

        for (asset, owner, spender) in stage.staged_allowances_of(&vault) {
            stage.revert_allowance(&asset, &owner, &spender);
        }

        let post = BalanceSnapshot::capture(&*stage, &vault, &touched);
        let reconciliation = reconcile(&plan, &pre, &post)?;

        let undeclared = stage.changes().balance_deltas.into_iter().find(|((asset, account), delta)| {
            *account == vault
                && matches!(delta, BalanceDelta::Debit(_))
                && !plan.spend_assets.contains(asset)
        });
        if let Some(((asset, _), _)) = undeclared {
            return Err(IntegrationError::custody(format!(
                "Undeclared asset left the vault: {asset}"
            )));
        }

        let mut added = Vec::new();
        for asset in reconciliation.incoming_assets() {
            if ledger.balance_of(&*stage, &asset).is_zero() {
                continue;
            }
            if ledger
                .add_tracked_asset(asset, config.max_tracked_assets)
                .map_err(IntegrationError::validation)?
            {
                added.push(asset);
            }
        }

        let mut removed = Vec::new();
        if plan.handle_type == SpendAssetsHandleType::Remove {
            let valuation = self.valuation.as_deref();
            for asset in &plan.spend_assets {
                if *asset == ledger.denomination_asset() || !ledger.is_tracked(asset) {
                    continue;
                }
                if !ledger.is_dust(&*stage, asset, &config.dust_tolerance, valuation) {
                    debug!(asset = %asset, "Asset above dust tolerance stays tracked");
                    continue;
                }
                if ledger
                    .remove_tracked_asset(asset)
                    .map_err(IntegrationError::validation)?
                {
                    removed.push(*asset);
                }
            }
        }

        Ok(StagedCall {
            ledger,
            plan,
            reconciliation,
            added,
            removed,
        })
    }

    fn ensure_receivable(
        &self,
        config: &IntegrationConfig,
        assets: &[AssetId],
    ) -> Result<(), IntegrationError> {
        let Some(valuation) = self.valuation.as_deref() else {
            return Ok(());
        };
        if !config.require_receivable_incoming {
            return Ok(());
        }
        match assets.iter().find(|a| !valuation.is_supported_asset(a)) {
            Some(asset) => Err(IntegrationError::validation(format!(
                "Non-receivable incoming asset: {asset}"
            ))),
            None => Ok(()),
        }
    }

    fn publish_call(&self, caller: Address, receipt: &Receipt, outgoing: &[AssetAmount]) {
        for asset in &receipt.tracked_assets_added {
            self.events.publish(IntegrationEvent::TrackedAssetAdded {
                fund: receipt.fund,
                asset: *asset,
            });
        }
        for asset in &receipt.tracked_assets_removed {
            self.events.publish(IntegrationEvent::TrackedAssetRemoved {
                fund: receipt.fund,
                asset: *asset,
            });
        }
        self.events
            .publish(IntegrationEvent::CallOnIntegrationExecuted {
                correlation_id: receipt.correlation_id,
                fund: receipt.fund,
                caller,
                adapter: receipt.adapter,
                selector: receipt.selector,
                incoming_assets: receipt.actual_incoming.iter().map(|a| a.asset).collect(),
                outgoing_assets: outgoing.iter().map(|a| a.asset).collect(),
            });
    }

    // =========================================================================
    // MANUAL TRACKED ASSETS
    // =========================================================================

    /// Start tracking `assets` for `fund`. Owner or asset manager.
    #[instrument(skip(self, assets), fields(fund = %fund, count = assets.len()))]
    pub fn add_tracked_assets(
        &self,
        caller: Address,
        fund: FundId,
        assets: &[AssetId],
    ) -> Result<(), IntegrationError> {
        let _guard = self.enter(fund)?;
        let handle = self.fund_handle(&fund)?;
        let (mut ledger, policies) = {
            let state = handle.read();
            Self::ensure_authorized(&state, &caller, "add tracked assets")?;
            (state.ledger().clone(), state.policies().clone())
        };

        let config = self.config.read().clone();
        if let Some(valuation) = self.valuation.as_deref() {
            if let Some(asset) = assets.iter().find(|a| !valuation.is_supported_asset(a)) {
                return Err(IntegrationError::validation(format!(
                    "Unsupported asset: {asset}"
                )));
            }
        }

        let mut added = Vec::new();
        for asset in assets {
            if ledger
                .add_tracked_asset(*asset, config.max_tracked_assets)
                .map_err(IntegrationError::validation)?
            {
                added.push(*asset);
            }
        }

        let context = HookContext::TrackedAssets {
            caller,
            assets: assets.to_vec(),
        };
        {
            let book = self.book.read();
            self.run_hook(
                fund,
                &ledger,
                &policies,
                &*book,
                PolicyHook::POST_ADD_TRACKED_ASSETS,
                &context,
            )?;
        }

        handle.write().replace_ledger(ledger);
        self.stats.lock().tracked_assets_added += added.len() as u64;
        metrics::record_tracked_asset_changes(added.len(), 0);
        for asset in added {
            info!(asset = %asset, "Tracked asset added");
            self.events
                .publish(IntegrationEvent::TrackedAssetAdded { fund, asset });
        }
        Ok(())
    }

    /// Stop tracking `assets` for `fund`. Owner or asset manager.
    ///
    /// Each asset's vault balance must be within the dust tolerance.
    #[instrument(skip(self, assets), fields(fund = %fund, count = assets.len()))]
    pub fn remove_tracked_assets(
        &self,
        caller: Address,
        fund: FundId,
        assets: &[AssetId],
    ) -> Result<(), IntegrationError> {
        let _guard = self.enter(fund)?;
        let handle = self.fund_handle(&fund)?;
        let (mut ledger, policies) = {
            let state = handle.read();
            Self::ensure_authorized(&state, &caller, "remove tracked assets")?;
            (state.ledger().clone(), state.policies().clone())
        };

        let config = self.config.read().clone();
        let context = HookContext::TrackedAssets {
            caller,
            assets: assets.to_vec(),
        };
        {
            let book = self.book.read();
            for asset in assets {
                ledger
                    .remove_tracked_asset_checked(
                        &*book,
                        asset,
                        &config.dust_tolerance,
                        self.valuation.as_deref(),
                    )
                    .map_err(IntegrationError::validation)?;
            }
            self.run_hook(
                fund,
                &ledger,
                &policies,
                &*book,
                PolicyHook::POST_REMOVE_TRACKED_ASSETS,
                &context,
            )?;
        }

        handle.write().replace_ledger(ledger);
        self.stats.lock().tracked_assets_removed += assets.len() as u64;
        metrics::record_tracked_asset_changes(0, assets.len());
        for asset in assets {
            info!(asset = %asset, "Tracked asset removed");
            self.events.publish(IntegrationEvent::TrackedAssetRemoved {
                fund,
                asset: *asset,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for IntegrationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationManager")
            .field("address", &self.address)
            .field("release_owner", &self.release_owner)
            .field("adapters", &self.adapters.read().len())
            .field("funds", &self.funds.len())
            .field("valuation", &self.valuation.is_some())
            .finish()
    }
}

fn zip_amounts(assets: &[AssetId], amounts: &[U256]) -> Vec<AssetAmount> {
    assets
        .iter()
        .zip(amounts)
        .map(|(asset, amount)| AssetAmount::new(*asset, *amount))
        .collect()
}
