//! # Integration Test Flows
//!
//! Reference scenarios end to end: an owner drives real adapters through
//! the integration manager against one shared asset book.
//!
//! ## Flows Tested:
//!
//! 1. **Lend with a pre-seeded adapter**: residuals are swept to the vault
//! 2. **Pool redemption with an under-delivered token**: full rollback
//! 3. **Swap through an allowance**: partial spend, allowance revoked
//! 4. **Rewards claim**: `None` handle brings assets in, spends nothing
//! 5. **Manual and adapter-driven tracked asset removal**

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fv_01_vault_ledger::DustTolerance;
    use fv_03_integration_manager::adapters::integrations::{
        selectors, ClaimRewardsArgs, LendingAdapter, MockExchange, MockLiquidityPool,
        PoolAdapter, PoolRedeemArgs, RedeemArgs, RemoveTrackedAssetsArgs, RewardsAdapter,
        SwapAdapter, TakeOrderArgs, TrackedAssetRemovalAdapter,
    };
    use fv_03_integration_manager::{
        Adapter, ErrorKind, IntegrationConfig, SpendAssetsHandleType,
    };
    use shared_types::{encode_args, Address, U256};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn pool_adapter() -> Address {
        Address::from_low_u64(0xAD02)
    }

    fn swap_adapter() -> Address {
        Address::from_low_u64(0xAD03)
    }

    fn rewards_adapter() -> Address {
        Address::from_low_u64(0xAD04)
    }

    fn removal_adapter() -> Address {
        Address::from_low_u64(0xAD05)
    }

    fn liquidity_pool() -> MockLiquidityPool {
        MockLiquidityPool {
            address: Address::from_low_u64(0x9002),
            share_token: Address::from_low_u64(0x5A),
            token_a: x(),
            token_b: eth(),
            a_per_share: U256::from(2u64),
            b_per_share: U256::one(),
        }
    }

    fn exchange() -> MockExchange {
        MockExchange {
            address: Address::from_low_u64(0x9003),
            rates: rates(),
        }
    }

    fn distributor() -> Address {
        Address::from_low_u64(0x9004)
    }

    fn with_all_adapters(env: &Env) {
        let pool = liquidity_pool();
        env.protocol(pool.address, &[pool.share_token]);
        env.protocol(exchange().address, &[]);
        env.protocol(distributor(), &[]);
        env.register(Arc::new(PoolAdapter::new(
            pool_adapter(),
            manager_address(),
            liquidity_pool(),
        )));
        env.register(Arc::new(SwapAdapter::new(
            swap_adapter(),
            manager_address(),
            exchange(),
        )));
        env.register(Arc::new(RewardsAdapter::new(
            rewards_adapter(),
            manager_address(),
            distributor(),
        )));
        env.register(Arc::new(TrackedAssetRemovalAdapter::new(
            removal_adapter(),
            manager_address(),
        )));
        env.events.clear();
    }

    fn redeem_args(shares: u64, min_a: u64, min_b: u64) -> Vec<u8> {
        encode_args(&PoolRedeemArgs {
            shares: U256::from(shares),
            min_token_a: U256::from(min_a),
            min_token_b: U256::from(min_b),
        })
        .unwrap()
        .as_slice()
        .to_vec()
    }

    fn take_order_args(outgoing: u64, min_incoming: u64) -> Vec<u8> {
        encode_args(&TakeOrderArgs {
            outgoing_asset: usd(),
            outgoing_amount: U256::from(outgoing),
            incoming_asset: eth(),
            min_incoming_amount: U256::from(min_incoming),
        })
        .unwrap()
        .as_slice()
        .to_vec()
    }

    // =============================================================================
    // LENDING
    // =============================================================================

    /// Vault holds 300 X, the adapter already holds 10 X; lending 100
    /// leaves the vault with 210 because the 10 are swept back.
    #[test]
    fn test_lend_sweeps_preseeded_adapter_balance() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.mint(x(), lending(), 10);

        let receipt = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap();

        assert_eq!(env.balance(x(), vault(1)), U256::from(210u64));
        assert_eq!(env.balance(x(), lending()), U256::zero());
        assert_eq!(env.balance(receipt_token(), vault(1)), U256::from(100u64));
        assert_eq!(receipt.spent(&x()), U256::from(90u64));
        assert_eq!(receipt.received(&receipt_token()), U256::from(100u64));
        assert_eq!(receipt.declared_spend[0].amount, U256::from(100u64));
        assert_eq!(receipt.handle_type, SpendAssetsHandleType::Transfer);
    }

    #[test]
    fn test_lend_then_redeem_round_trip() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap();

        let redeem = encode_args(&RedeemArgs {
            receipt_amount: U256::from(100u64),
            min_underlying_amount: U256::from(100u64),
        })
        .unwrap();
        env.manager
            .call_on_integration(owner(), fund(1), lending(), selectors::redeem(), redeem.as_slice())
            .unwrap();

        assert_eq!(env.balance(x(), vault(1)), U256::from(300u64));
        assert_eq!(env.balance(receipt_token(), vault(1)), U256::zero());
        // Zero balance does not untrack; only Remove does.
        assert!(env
            .manager
            .tracked_assets(&fund(1))
            .unwrap()
            .contains(&receipt_token()));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let adapter = LendingAdapter::new(lending(), manager_address(), lending_pool());
        let args = lend_args(42, 40);
        let plans: Vec<_> = (0..3)
            .map(|_| {
                adapter
                    .parse_asset_plan(vault(1), selectors::lend(), &args)
                    .unwrap()
            })
            .collect();

        assert!(plans.windows(2).all(|w| w[0] == w[1]));
    }

    // =============================================================================
    // POOL REDEMPTION
    // =============================================================================

    /// tokenA reserve is empty, so redeeming delivers 0 of a declared
    /// minimum of 1: the whole call reverts and the shares stay put.
    #[test]
    fn test_under_delivered_redemption_reverts_entirely() {
        let env = Env::new();
        with_all_adapters(&env);
        let pool = liquidity_pool();
        env.mint(pool.share_token, vault(1), 10);
        env.mint(eth(), pool.address, 100);
        let before = env.snapshot();

        let err = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                pool_adapter(),
                selectors::redeem(),
                &redeem_args(10, 1, 1),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CustodyViolation);
        assert!(err.to_string().contains("less than expected"));
        assert_eq!(env.snapshot(), before);
        assert_eq!(env.balance(pool.share_token, vault(1)), U256::from(10u64));
        assert!(env.events.is_empty());
    }

    #[test]
    fn test_redemption_tracks_both_tokens() {
        let env = Env::new();
        with_all_adapters(&env);
        let pool = liquidity_pool();
        env.mint(pool.share_token, vault(1), 10);
        env.mint(x(), pool.address, 100);
        env.mint(eth(), pool.address, 100);

        let receipt = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                pool_adapter(),
                selectors::redeem(),
                &redeem_args(10, 20, 10),
            )
            .unwrap();

        assert_eq!(receipt.received(&x()), U256::from(20u64));
        assert_eq!(receipt.received(&eth()), U256::from(10u64));
        assert_eq!(receipt.tracked_assets_added, vec![x(), eth()]);
        assert_eq!(env.balance(pool.share_token, vault(1)), U256::zero());
    }

    // =============================================================================
    // SWAP (APPROVE)
    // =============================================================================

    #[test]
    fn test_swap_spends_through_allowance_and_revokes_it() {
        let env = Env::priced(IntegrationConfig::default());
        with_all_adapters(&env);
        env.mint(usd(), vault(1), 5_000);
        env.mint(eth(), exchange().address, 10);

        let receipt = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                swap_adapter(),
                selectors::take_order(),
                &take_order_args(2_000, 2),
            )
            .unwrap();

        assert_eq!(env.balance(usd(), vault(1)), U256::from(3_000u64));
        assert_eq!(env.balance(eth(), vault(1)), U256::from(2u64));
        assert_eq!(env.allowance(usd(), vault(1), swap_adapter()), U256::zero());
        assert_eq!(receipt.handle_type, SpendAssetsHandleType::Approve);
        assert_eq!(receipt.spent(&usd()), U256::from(2_000u64));
    }

    #[test]
    fn test_non_receivable_incoming_asset_rejected() {
        let env = Env::priced(IntegrationConfig::default());
        with_all_adapters(&env);
        env.mint(usd(), vault(1), 5_000);

        let args = encode_args(&TakeOrderArgs {
            outgoing_asset: usd(),
            outgoing_amount: U256::from(10u64),
            incoming_asset: Address::from_low_u64(0x404),
            min_incoming_amount: U256::one(),
        })
        .unwrap();
        let err = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                swap_adapter(),
                selectors::take_order(),
                args.as_slice(),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Non-receivable incoming asset"));
    }

    // =============================================================================
    // REWARDS (NONE)
    // =============================================================================

    #[test]
    fn test_rewards_claim_spends_nothing() {
        let env = Env::new();
        with_all_adapters(&env);
        env.mint(usd(), vault(1), 1_000);
        env.mint(eth(), distributor(), 3);

        let args = encode_args(&ClaimRewardsArgs {
            reward_asset: eth(),
            amount: U256::from(3u64),
        })
        .unwrap();
        let receipt = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                rewards_adapter(),
                selectors::claim_rewards(),
                args.as_slice(),
            )
            .unwrap();

        assert_eq!(receipt.handle_type, SpendAssetsHandleType::None);
        assert!(receipt.actual_spend.is_empty());
        assert_eq!(env.balance(usd(), vault(1)), U256::from(1_000u64));
        assert_eq!(env.balance(eth(), vault(1)), U256::from(3u64));
        assert!(env.manager.tracked_assets(&fund(1)).unwrap().contains(&eth()));
    }

    #[test]
    fn test_empty_rewards_claim_does_not_track() {
        let env = Env::new();
        with_all_adapters(&env);

        let args = encode_args(&ClaimRewardsArgs {
            reward_asset: eth(),
            amount: U256::from(3u64),
        })
        .unwrap();
        let receipt = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                rewards_adapter(),
                selectors::claim_rewards(),
                args.as_slice(),
            )
            .unwrap();

        assert!(receipt.tracked_assets_added.is_empty());
        assert_eq!(env.manager.tracked_assets(&fund(1)).unwrap(), vec![usd()]);
    }

    // =============================================================================
    // TRACKED ASSET REMOVAL
    // =============================================================================

    /// Removal over dust fails until the tolerance is raised.
    #[test]
    fn test_manual_removal_over_dust_then_after_tolerance_raised() {
        let env = Env::priced(
            IntegrationConfig::default()
                .with_dust_tolerance(DustTolerance::valued(usd(), U256::from(50u64))),
        );
        env.mint(x(), vault(1), 30);
        env.manager
            .add_tracked_assets(owner(), fund(1), &[x()])
            .unwrap();

        // 30 X at 2 USD each = 60 USD > 50.
        let err = env
            .manager
            .remove_tracked_assets(owner(), fund(1), &[x()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Exceeds dust threshold"));
        assert!(env.manager.tracked_assets(&fund(1)).unwrap().contains(&x()));

        env.manager
            .set_dust_tolerance(release_owner(), DustTolerance::valued(usd(), U256::from(60u64)))
            .unwrap();
        env.manager
            .remove_tracked_assets(owner(), fund(1), &[x()])
            .unwrap();
        assert_eq!(env.manager.tracked_assets(&fund(1)).unwrap(), vec![usd()]);
        // Untracked assets may still carry balances.
        assert_eq!(env.balance(x(), vault(1)), U256::from(30u64));
    }

    #[test]
    fn test_denomination_asset_cannot_be_removed() {
        let env = Env::new();
        let err = env
            .manager
            .remove_tracked_assets(owner(), fund(1), &[usd()])
            .unwrap_err();
        assert!(err.to_string().contains("Cannot remove denomination asset"));
    }

    #[test]
    fn test_remove_handle_evolves_tracked_set() {
        let env = Env::new();
        with_all_adapters(&env);
        env.mint(eth(), vault(1), 5);
        env.manager
            .add_tracked_assets(owner(), fund(1), &[x(), eth()])
            .unwrap();

        let args = encode_args(&RemoveTrackedAssetsArgs {
            assets: vec![x(), eth()],
        })
        .unwrap();
        let receipt = env
            .manager
            .call_on_integration(
                owner(),
                fund(1),
                removal_adapter(),
                selectors::remove_tracked_assets(),
                args.as_slice(),
            )
            .unwrap();

        assert_eq!(receipt.tracked_assets_removed, vec![x()]);
        assert_eq!(env.manager.tracked_assets(&fund(1)).unwrap(), vec![usd(), eth()]);
    }

    #[test]
    fn test_events_published_only_on_commit() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);

        let _ = env.manager.call_on_integration(
            owner(),
            fund(1),
            lending(),
            selectors::lend(),
            &lend_args(100, 1_000),
        );
        assert!(env.events.is_empty());

        env.manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap();
        let names: Vec<_> = env.events.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["TrackedAssetAdded", "CallOnIntegrationExecuted"]);
        assert!(env
            .events
            .events()
            .iter()
            .all(|e| e.fund() == Some(fund(1))));
    }

    #[test]
    fn test_stats_count_outcomes() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);

        env.manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(10, 10))
            .unwrap();
        let _ = env.manager.call_on_integration(
            stranger(),
            fund(1),
            lending(),
            selectors::lend(),
            &lend_args(10, 10),
        );

        let stats = env.manager.stats();
        assert_eq!(stats.calls_executed, 2);
        assert_eq!(stats.successful_calls, 1);
        assert_eq!(stats.unauthorized_requests, 1);
        assert_eq!(stats.tracked_assets_added, 1);
    }
}
