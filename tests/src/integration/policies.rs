//! # Policy Integration Tests
//!
//! Policies enabled per fund, evaluated at the pipeline's hook points and
//! at the share-flow hooks exposed through `validate_policies`.
//!
//! A rejection at any hook must leave the book and tracked set exactly as
//! they were before the call.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fv_02_policy_manager::{
        AddressListSettings, MaxConcentrationSettings, MinMaxInvestmentSettings,
    };
    use fv_03_integration_manager::adapters::integrations::selectors;
    use fv_03_integration_manager::{ErrorKind, IntegrationConfig, IntegrationError};
    use shared_types::{Address, HookContext, PolicyHook, U256};

    fn list(addresses: Vec<Address>) -> AddressListSettings {
        AddressListSettings { addresses }
    }

    fn buy(buyer: Address, amount: U256) -> HookContext {
        HookContext::BuyShares {
            caller: buyer,
            buyer,
            investment_amount: amount,
            min_shares_quantity: U256::one(),
        }
    }

    fn ether(tenths: u64) -> U256 {
        U256::from(tenths) * U256::exp10(17)
    }

    // =========================================================================
    // SHARE FLOW HOOKS
    // =========================================================================

    #[test]
    fn test_min_max_investment_bounds_are_inclusive() {
        let env = Env::new();
        env.enable(
            1,
            "MIN_MAX_INVESTMENT",
            &MinMaxInvestmentSettings {
                min_investment_amount: ether(10),
                max_investment_amount: ether(20),
            },
        );

        let check = |amount: U256| {
            env.manager
                .validate_policies(&fund(1), PolicyHook::POST_BUY_SHARES, &buy(stranger(), amount))
        };

        assert!(check(ether(10)).is_ok());
        assert!(check(ether(20)).is_ok());
        assert!(check(ether(15)).is_ok());

        let low = check(U256::from(99u64) * U256::exp10(16)).unwrap_err();
        assert_eq!(low.kind(), ErrorKind::PolicyRejection);
        assert_eq!(low.rejecting_policy(), Some("MIN_MAX_INVESTMENT"));

        let high = check(U256::from(201u64) * U256::exp10(16)).unwrap_err();
        assert_eq!(high.rejecting_policy(), Some("MIN_MAX_INVESTMENT"));
    }

    #[test]
    fn test_investor_whitelist_checks_buyer() {
        let env = Env::new();
        let investor = Address::from_low_u64(0x1A);
        env.enable(1, "INVESTOR_WHITELIST", &list(vec![investor]));

        assert!(env
            .manager
            .validate_policies(&fund(1), PolicyHook::PRE_BUY_SHARES, &buy(investor, U256::one()))
            .is_ok());
        let err = env
            .manager
            .validate_policies(&fund(1), PolicyHook::PRE_BUY_SHARES, &buy(stranger(), U256::one()))
            .unwrap_err();
        assert_eq!(err.rejecting_policy(), Some("INVESTOR_WHITELIST"));
    }

    #[test]
    fn test_hook_without_enabled_policies_passes() {
        let env = Env::new();
        assert!(env
            .manager
            .validate_policies(&fund(1), PolicyHook::POST_BUY_SHARES, &buy(stranger(), U256::zero()))
            .is_ok());
    }

    // =========================================================================
    // CALL ON INTEGRATION HOOKS
    // =========================================================================

    #[test]
    fn test_pre_hook_rejection_moves_nothing() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.enable(1, "ADAPTER_BLACKLIST", &list(vec![lending()]));
        env.events.clear();
        let before = env.snapshot();

        let err = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap_err();

        match &err {
            IntegrationError::PolicyRejection { policy, hook, .. } => {
                assert_eq!(policy, "ADAPTER_BLACKLIST");
                assert_eq!(*hook, PolicyHook::PRE_CALL_ON_INTEGRATION);
            }
            other => panic!("expected a policy rejection, got {other:?}"),
        }
        assert_eq!(env.snapshot(), before);
        assert!(env.events.is_empty());
    }

    /// Lending X returns a blacklisted receipt token: rejected after the
    /// adapter ran, so everything it did is undone.
    #[test]
    fn test_post_hook_rejection_rolls_back_execution() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.enable(1, "ASSET_BLACKLIST", &list(vec![receipt_token()]));
        let before = env.snapshot();

        let err = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PolicyRejection);
        assert!(err.to_string().contains("ASSET_BLACKLIST"));
        assert_eq!(env.snapshot(), before);
        assert_eq!(env.manager.tracked_assets(&fund(1)).unwrap(), vec![usd()]);
        assert_eq!(env.balance(receipt_token(), lending_pool().address), U256::zero());
    }

    #[test]
    fn test_max_concentration_sees_staged_balances() {
        let env = Env::priced(IntegrationConfig::default());
        env.mint(usd(), vault(1), 1_000);
        env.mint(x(), vault(1), 300);
        env.enable(
            1,
            "MAX_CONCENTRATION",
            &MaxConcentrationSettings {
                max_concentration_bps: 1_000,
            },
        );

        // 100 receipts at 2 = 200 of a 1200 GAV: 16.7% > 10%.
        let before = env.snapshot();
        let err = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap_err();
        assert_eq!(err.rejecting_policy(), Some("MAX_CONCENTRATION"));
        assert_eq!(env.snapshot(), before);

        // 50 receipts at 2 = 100 of a 1100 GAV: 9.1%.
        env.manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(50, 50))
            .unwrap();
        assert_eq!(env.balance(receipt_token(), vault(1)), U256::from(50u64));
    }

    #[test]
    fn test_asset_blacklist_guards_manual_tracking() {
        let env = Env::new();
        env.enable(1, "ASSET_BLACKLIST", &list(vec![eth()]));
        env.events.clear();

        let err = env
            .manager
            .add_tracked_assets(owner(), fund(1), &[x(), eth()])
            .unwrap_err();

        assert_eq!(err.rejecting_policy(), Some("ASSET_BLACKLIST"));
        assert_eq!(env.manager.tracked_assets(&fund(1)).unwrap(), vec![usd()]);
        assert!(env.events.is_empty());
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[test]
    fn test_deregistered_policy_stays_active_where_enabled() {
        let env = Env::new();
        env.add_fund(2);
        env.mint(x(), vault(1), 300);
        env.enable(1, "ASSET_BLACKLIST", &list(vec![receipt_token()]));

        env.manager
            .deregister_policy(release_owner(), "ASSET_BLACKLIST")
            .unwrap();

        let err = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(10, 10))
            .unwrap_err();
        assert_eq!(err.rejecting_policy(), Some("ASSET_BLACKLIST"));

        let err = env
            .manager
            .enable_policy(
                owner(),
                fund(2),
                "ASSET_BLACKLIST",
                &serde_json::to_vec(&list(vec![])).unwrap(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_policies_are_per_fund() {
        let env = Env::new();
        env.add_fund(2);
        env.mint(x(), vault(1), 100);
        env.mint(x(), vault(2), 100);
        env.enable(1, "ADAPTER_BLACKLIST", &list(vec![lending()]));

        assert!(env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(10, 10))
            .is_err());
        assert!(env
            .manager
            .call_on_integration(owner(), fund(2), lending(), selectors::lend(), &lend_args(10, 10))
            .is_ok());
        assert_eq!(env.manager.enabled_policies(&fund(2)).unwrap(), Vec::<&str>::new());
    }

    #[test]
    fn test_invalid_settings_rejected_on_enable() {
        let env = Env::new();
        let err = env
            .manager
            .enable_policy(
                owner(),
                fund(1),
                "MAX_CONCENTRATION",
                &serde_json::to_vec(&MaxConcentrationSettings {
                    max_concentration_bps: 0,
                })
                .unwrap(),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(env.manager.enabled_policies(&fund(1)).unwrap().is_empty());
    }
}
