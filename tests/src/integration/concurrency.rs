//! # Concurrency Tests
//!
//! Distinct funds run their pipelines in parallel against one shared book
//! and one shared lending pool. Operations on the same fund never overlap:
//! a second one is refused outright.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fv_01_vault_ledger::AssetReader;
    use fv_03_integration_manager::adapters::integrations::selectors;
    use fv_03_integration_manager::ErrorKind;
    use shared_types::U256;
    use std::sync::Arc;
    use std::thread;

    const FUNDS: u64 = 8;
    const ROUNDS: u64 = 5;

    #[test]
    fn test_parallel_funds_share_one_pool() {
        let env = Arc::new(Env::new());
        for n in 2..=FUNDS {
            env.add_fund(n);
        }
        for n in 1..=FUNDS {
            env.mint(x(), vault(n), 100);
        }

        let handles: Vec<_> = (1..=FUNDS)
            .map(|n| {
                let env = Arc::clone(&env);
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        env.manager
                            .call_on_integration(
                                owner(),
                                fund(n),
                                lending(),
                                selectors::lend(),
                                &lend_args(10, 10),
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for n in 1..=FUNDS {
            assert_eq!(env.balance(x(), vault(n)), U256::from(50u64));
            assert_eq!(env.balance(receipt_token(), vault(n)), U256::from(50u64));
        }
        assert_eq!(
            env.balance(x(), lending_pool().address),
            U256::from(FUNDS * ROUNDS * 10)
        );
        assert_eq!(env.manager.stats().successful_calls, FUNDS * ROUNDS);
    }

    #[test]
    fn test_same_fund_contention_is_refused_not_interleaved() {
        let env = Arc::new(Env::new());
        env.mint(x(), vault(1), 1_000);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let env = Arc::clone(&env);
                thread::spawn(move || {
                    let mut committed = 0u64;
                    for _ in 0..20 {
                        match env.manager.call_on_integration(
                            owner(),
                            fund(1),
                            lending(),
                            selectors::lend(),
                            &lend_args(10, 10),
                        ) {
                            Ok(_) => committed += 1,
                            Err(err) => assert_eq!(err.kind(), ErrorKind::Reentrancy),
                        }
                    }
                    committed
                })
            })
            .collect();
        let committed: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert!(committed > 0);
        assert_eq!(env.balance(x(), vault(1)), U256::from(1_000 - committed * 10));
        assert_eq!(env.balance(receipt_token(), vault(1)), U256::from(committed * 10));

        let stats = env.manager.stats();
        assert_eq!(stats.calls_executed, 80);
        assert_eq!(stats.successful_calls, committed);
        assert_eq!(stats.reentrancy_rejections, 80 - committed);
    }

    #[test]
    fn test_reads_during_parallel_writes_stay_consistent() {
        let env = Arc::new(Env::new());
        env.mint(x(), vault(1), 1_000);

        let writer = {
            let env = Arc::clone(&env);
            thread::spawn(move || {
                for _ in 0..25 {
                    env.manager
                        .call_on_integration(
                            owner(),
                            fund(1),
                            lending(),
                            selectors::lend(),
                            &lend_args(10, 10),
                        )
                        .unwrap();
                }
            })
        };

        // A committed lend moves X and receipts in one write: the sum never
        // drifts from the starting balance.
        for _ in 0..200 {
            let book = env.manager.book();
            let book = book.read();
            let total =
                book.balance_of(&x(), &vault(1)) + book.balance_of(&receipt_token(), &vault(1));
            assert_eq!(total, U256::from(1_000u64));
        }
        writer.join().unwrap();
    }
}
