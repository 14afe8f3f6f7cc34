//! # Token Behaviour Tests
//!
//! Assets that do not move the amount asked for: fee-on-transfer tokens and
//! protocols that under-deliver. Reconciliation works from observed vault
//! balances, never from what the adapter or the arguments claim.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fv_03_integration_manager::adapters::integrations::selectors;
    use fv_03_integration_manager::{AssetPlan, ErrorKind, SpendAssetsHandleType};
    use shared_types::{Address, U256};
    use std::sync::Arc;

    /// 1% fee on the receipt token: the sweep back to the vault delivers
    /// 99 of 100 minted.
    #[test]
    fn test_fee_on_incoming_asset_fails_exact_minimum() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.set_fee(receipt_token(), 100);
        let before = env.snapshot();

        let err = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CustodyViolation);
        assert!(err.to_string().contains("received 99, minimum 100"));
        assert_eq!(env.snapshot(), before);
    }

    #[test]
    fn test_fee_on_incoming_asset_reports_actual_amount() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.set_fee(receipt_token(), 100);

        let receipt = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 99))
            .unwrap();

        assert_eq!(receipt.received(&receipt_token()), U256::from(99u64));
        assert_eq!(receipt.declared_incoming[0].amount, U256::from(99u64));
        assert_eq!(env.balance(receipt_token(), vault(1)), U256::from(99u64));
    }

    /// 1% fee on the lent asset: the adapter receives 99 and cannot lend
    /// the 100 its arguments ask for.
    #[test]
    fn test_fee_on_spend_asset_starves_adapter() {
        let env = Env::new();
        env.mint(x(), vault(1), 300);
        env.set_fee(x(), 100);
        let before = env.snapshot();

        let err = env
            .manager
            .call_on_integration(owner(), fund(1), lending(), selectors::lend(), &lend_args(100, 100))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalCallFailure);
        assert_eq!(env.snapshot(), before);
    }

    /// A protocol that pays less than promised while the adapter claims
    /// success.
    #[test]
    fn test_under_delivery_caught_by_vault_balance() {
        let env = Env::new();
        let protocol = Address::from_low_u64(0x9F);
        let adapter = Address::from_low_u64(0xAD88);
        env.mint(usd(), vault(1), 1_000);
        env.mint(eth(), protocol, 100);
        env.protocol(protocol, &[]);
        env.register(Arc::new(ScriptedAdapter::new(
            adapter,
            AssetPlan::new(
                SpendAssetsHandleType::Transfer,
                vec![(usd(), U256::from(500u64))],
                vec![(eth(), U256::from(5u64))],
            ),
            move |assets, vault, _me| {
                assets.transfer(&usd(), &protocol, U256::from(500u64))?;
                assets
                    .enter_protocol(protocol)?
                    .transfer(&eth(), vault, U256::from(4u64))?;
                Ok(())
            },
        )));
        let before = env.snapshot();

        let err = env
            .manager
            .call_on_integration(owner(), fund(1), adapter, scripted_selector(), &[])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CustodyViolation);
        assert!(err.to_string().contains("received 4, minimum 5"));
        assert_eq!(env.snapshot(), before);
    }

    /// Incoming asset that is also spent: only the net gain counts.
    #[test]
    fn test_asset_both_spent_and_incoming_nets_out() {
        let env = Env::new();
        let adapter = Address::from_low_u64(0xAD89);
        let donor = Address::from_low_u64(0x9E);
        env.mint(x(), vault(1), 100);
        env.mint(x(), donor, 50);
        env.protocol(donor, &[]);
        env.register(Arc::new(ScriptedAdapter::new(
            adapter,
            AssetPlan::new(
                SpendAssetsHandleType::Transfer,
                vec![(x(), U256::from(20u64))],
                vec![(x(), U256::from(25u64))],
            ),
            move |assets, _vault, me| {
                assets
                    .enter_protocol(donor)?
                    .transfer(&x(), me, U256::from(30u64))?;
                Ok(())
            },
        )));

        let receipt = env
            .manager
            .call_on_integration(owner(), fund(1), adapter, scripted_selector(), &[])
            .unwrap();

        // 20 out, 20 + 30 swept back: a net gain of 30.
        assert_eq!(receipt.received(&x()), U256::from(30u64));
        assert_eq!(env.balance(x(), vault(1)), U256::from(130u64));
    }
}
