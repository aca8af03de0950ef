//! Property tests over random operation sequences

mod common;

use common::*;
use creditnft_common::{CreditLine, Usdc};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Draw(u64),
    Repay(u64),
    Wait(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..1_200_000_000).prop_map(Op::Draw),
        4 => (0u64..1_200_000_000).prop_map(Op::Repay),
        1 => (0i64..45).prop_map(Op::Wait),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_failed_calls_change_nothing(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let rt = runtime();
        rt.block_on(async {
            let h = Harness::new();
            let token_id = h.engine.stake_and_mint(&user1()).await.unwrap();

            for op in ops {
                let before: CreditLine = h.engine.get_credit_data(token_id).await.unwrap();
                let result = match op {
                    Op::Draw(units) => h
                        .engine
                        .draw_credit(&user1(), token_id, Usdc::from_units(units))
                        .await
                        .map(|_| ()),
                    Op::Repay(units) => h
                        .engine
                        .repay_credit(&user1(), token_id, Usdc::from_units(units))
                        .await
                        .map(|_| ()),
                    Op::Wait(days) => {
                        h.advance_days(days);
                        Ok(())
                    }
                };

                let after = h.engine.get_credit_data(token_id).await.unwrap();
                if result.is_err() {
                    prop_assert_eq!(&after, &before);
                }
                prop_assert!(after.credit_score.value() <= 850);
                prop_assert_eq!(after.credit_limit, usdc(1000));
                prop_assert_eq!(after.staked_amount, usdc(500));
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_draws_and_repays_stay_within_limit(
        amounts in prop::collection::vec((any::<bool>(), 0u64..1_500_000_000), 1..60)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let h = Harness::new();
            let token_id = h.engine.stake_and_mint(&user1()).await.unwrap();

            for (is_draw, units) in amounts {
                let amount = Usdc::from_units(units);
                let before = h.engine.get_credit_data(token_id).await.unwrap().used_credit;

                if is_draw {
                    match h.engine.draw_credit(&user1(), token_id, amount).await {
                        Ok(used) => {
                            prop_assert_eq!(used, before.checked_add(amount).unwrap());
                        }
                        Err(_) => {
                            prop_assert!(before.checked_add(amount).unwrap() > usdc(1000));
                        }
                    }
                } else {
                    match h.engine.repay_credit(&user1(), token_id, amount).await {
                        Ok(used) => {
                            prop_assert_eq!(used, before.checked_sub(amount).unwrap());
                        }
                        Err(_) => {
                            prop_assert!(amount > before);
                        }
                    }
                }

                let line = h.engine.get_credit_data(token_id).await.unwrap();
                prop_assert!(line.used_credit <= line.credit_limit);
                prop_assert_eq!(
                    h.engine.get_available_credit(token_id).await.unwrap(),
                    line.credit_limit.checked_sub(line.used_credit).unwrap()
                );
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
