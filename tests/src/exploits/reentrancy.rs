//! # Reentrancy Exploit Tests
//!
//! An adapter that calls back into the integration manager from inside
//! `execute`. Re-entering the fund whose pipeline is running is refused;
//! entering a different fund is an ordinary, independent call.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fv_01_vault_ledger::AccountScope;
    use fv_03_integration_manager::adapters::integrations::selectors;
    use fv_03_integration_manager::{
        Adapter, AdapterBase, AdapterError, AssetPlan, ErrorKind, IntegrationError,
        IntegrationManager, Receipt, SpendAssetsHandleType,
    };
    use parking_lot::Mutex;
    use shared_types::{AdapterId, Address, FundId, Selector, U256};
    use std::sync::{Arc, OnceLock, Weak};

    fn reentrant() -> Address {
        Address::from_low_u64(0xAD77)
    }

    /// Takes 50 X from the vault, calls `lend` on `target` from inside
    /// `execute`, then leaves the X to be swept back.
    struct ReentrantAdapter {
        base: AdapterBase,
        target: FundId,
        propagate: bool,
        manager: OnceLock<Weak<IntegrationManager>>,
        outcome: Mutex<Option<Result<Receipt, IntegrationError>>>,
    }

    impl ReentrantAdapter {
        fn new(target: FundId, propagate: bool) -> Self {
            Self {
                base: AdapterBase::new(reentrant(), manager_address()),
                target,
                propagate,
                manager: OnceLock::new(),
                outcome: Mutex::new(None),
            }
        }

        fn outcome(&self) -> Option<Result<Receipt, IntegrationError>> {
            self.outcome.lock().clone()
        }
    }

    impl Adapter for ReentrantAdapter {
        fn identifier(&self) -> &'static str {
            "REENTRANT"
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
            Ok(AssetPlan::new(
                SpendAssetsHandleType::Transfer,
                vec![(x(), U256::from(50u64))],
                vec![],
            ))
        }

        fn execute(
            &self,
            caller: Address,
            _assets: &mut AccountScope<'_, '_>,
            _vault: Address,
            _selector: Selector,
            _args: &[u8],
        ) -> Result<(), AdapterError> {
            self.base.ensure_integration_manager(&caller)?;
            let manager = self
                .manager
                .get()
                .and_then(Weak::upgrade)
                .ok_or_else(|| AdapterError::Protocol("manager gone".into()))?;

            let result = manager.call_on_integration(
                self.base.address,
                self.target,
                lending(),
                selectors::lend(),
                &lend_args(10, 10),
            );
            *self.outcome.lock() = Some(result.clone());

            match result {
                Err(err) if self.propagate => Err(AdapterError::Protocol(err.to_string())),
                _ => Ok(()),
            }
        }
    }

    fn install(env: &Env, target: FundId, propagate: bool) -> Arc<ReentrantAdapter> {
        let adapter = Arc::new(ReentrantAdapter::new(target, propagate));
        adapter
            .manager
            .set(Arc::downgrade(&env.manager))
            .unwrap_or_else(|_| panic!("manager already set"));
        env.register(adapter.clone());
        adapter
    }

    fn run(env: &Env) -> Result<Receipt, IntegrationError> {
        env.manager
            .call_on_integration(owner(), fund(1), reentrant(), scripted_selector(), &[])
    }

    #[test]
    fn test_same_fund_reentry_refused_and_swallowed() {
        let env = Env::new();
        env.mint(x(), vault(1), 100);
        let adapter = install(&env, fund(1), false);

        let receipt = run(&env).unwrap();

        let inner = adapter.outcome().unwrap().unwrap_err();
        assert_eq!(inner, IntegrationError::Reentrancy(fund(1)));
        assert_eq!(receipt.spent(&x()), U256::zero());
        assert_eq!(env.balance(x(), vault(1)), U256::from(100u64));
        assert_eq!(env.balance(receipt_token(), vault(1)), U256::zero());
    }

    #[test]
    fn test_same_fund_reentry_propagated_reverts_outer_call() {
        let env = Env::new();
        env.mint(x(), vault(1), 100);
        install(&env, fund(1), true);
        env.events.clear();
        let before = env.snapshot();

        let err = run(&env).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalCallFailure);
        assert!(err.to_string().contains("Reentrancy"));
        assert_eq!(env.snapshot(), before);
        assert!(env.events.is_empty());

        let stats = env.manager.stats();
        assert_eq!(stats.reentrancy_rejections, 1);
        assert_eq!(stats.external_call_failures, 1);
    }

    /// The reentrant adapter is an asset manager of fund 2, so its nested
    /// call on fund 2 commits on its own while fund 1's pipeline is still
    /// staged.
    #[test]
    fn test_cross_fund_reentry_is_independent() {
        let env = Env::new();
        env.add_fund(2);
        env.mint(x(), vault(1), 100);
        env.mint(x(), vault(2), 100);
        env.manager
            .add_asset_managers(owner(), fund(2), &[reentrant()])
            .unwrap();
        let adapter = install(&env, fund(2), true);

        run(&env).unwrap();

        let inner = adapter.outcome().unwrap().unwrap();
        assert_eq!(inner.fund, fund(2));
        assert_eq!(env.balance(x(), vault(1)), U256::from(100u64));
        assert_eq!(env.balance(x(), vault(2)), U256::from(90u64));
        assert_eq!(env.balance(receipt_token(), vault(2)), U256::from(10u64));
        assert_eq!(env.manager.stats().successful_calls, 2);
    }

    #[test]
    fn test_reentry_without_rights_is_unauthorized() {
        let env = Env::new();
        env.add_fund(2);
        env.mint(x(), vault(1), 100);
        let adapter = install(&env, fund(2), false);

        run(&env).unwrap();

        let inner = adapter.outcome().unwrap().unwrap_err();
        assert_eq!(inner.kind(), ErrorKind::Unauthorized);
    }
}
