//! Gateway failure handling
//!
//! A failed transfer must leave the credit line exactly as it was.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use creditnft_common::{AccountId, CreditError, TokenId, TransferError, Usdc};
use creditnft_engine::{CardPayments, PaymentGateway};
use mockall::mock;
use mockall::predicate::eq;

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        async fn transfer_in(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError>;
        async fn transfer_out(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError>;
        async fn transfer(
            &self,
            from: &AccountId,
            to: &AccountId,
            amount: Usdc,
        ) -> Result<(), TransferError>;
        async fn balance_of(&self, owner: &AccountId) -> Result<Usdc, TransferError>;
    }
}

fn offline() -> TransferError {
    TransferError::Unavailable("gateway offline".to_string())
}

#[tokio::test]
async fn test_failed_stake_mints_nothing() {
    let mut gateway = MockGateway::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    gateway
        .expect_transfer_in()
        .with(eq(user1()), eq(usdc(500)))
        .times(2)
        .returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(offline())
            } else {
                Ok(())
            }
        });

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));

    let result = engine.stake_and_mint(&user1()).await;
    assert!(matches!(result, Err(CreditError::TransferFailed(TransferError::Unavailable(_)))));
    assert!(!engine.has_line(&user1()));
    assert_eq!(engine.line_count(), 0);

    let token_id = engine.stake_and_mint(&user1()).await.unwrap();
    assert_eq!(token_id, TokenId(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_disbursement_keeps_line() {
    let mut gateway = MockGateway::new();
    gateway.expect_transfer_in().returning(|_, _| Ok(()));
    gateway
        .expect_transfer_out()
        .times(1)
        .returning(|_, _| Err(offline()));

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();
    let before = engine.get_credit_data(token_id).await.unwrap();

    let result = engine.draw_credit(&user1(), token_id, usdc(200)).await;

    assert!(matches!(result, Err(CreditError::TransferFailed(_))));
    assert_eq!(engine.get_credit_data(token_id).await.unwrap(), before);
}

#[tokio::test]
async fn test_failed_disbursement_keeps_pending_rollover() {
    let mut gateway = MockGateway::new();
    gateway.expect_transfer_in().returning(|_, _| Ok(()));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    gateway.expect_transfer_out().returning(move |_, _| {
        // First draw succeeds, the one after the cycle fails.
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(())
        } else {
            Err(offline())
        }
    });

    let (engine, clock) = engine_with_gateway(Arc::new(gateway));
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();
    engine.draw_credit(&user1(), token_id, usdc(100)).await.unwrap();

    clock.advance(chrono::Duration::days(31));
    let result = engine.draw_credit(&user1(), token_id, usdc(10)).await;
    assert!(result.is_err());

    let line = engine.get_credit_data(token_id).await.unwrap();
    assert_eq!(line.used_credit, usdc(100));
    assert_eq!(line.credit_score.value(), 700);
    assert_eq!(line.last_reset, GENESIS_MS);

    // The rollover is still due and applies on the next check.
    assert_eq!(engine.get_available_credit(token_id).await.unwrap(), usdc(895));
}

#[tokio::test]
async fn test_failed_collection_keeps_line() {
    let mut gateway = MockGateway::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    gateway.expect_transfer_in().returning(move |_, _| {
        // Stake goes through, repayment does not.
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(())
        } else {
            Err(TransferError::InsufficientFunds {
                required: usdc(150),
                balance: usdc(10),
            })
        }
    });
    gateway.expect_transfer_out().returning(|_, _| Ok(()));

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();
    engine.draw_credit(&user1(), token_id, usdc(200)).await.unwrap();
    let before = engine.get_credit_data(token_id).await.unwrap();

    let result = engine.repay_credit(&user1(), token_id, usdc(150)).await;

    assert!(matches!(
        result,
        Err(CreditError::TransferFailed(TransferError::InsufficientFunds { .. }))
    ));
    assert_eq!(engine.get_credit_data(token_id).await.unwrap(), before);
}

#[tokio::test]
async fn test_overpayment_never_reaches_gateway() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_transfer_in()
        .with(eq(user1()), eq(usdc(500)))
        .times(1)
        .returning(|_, _| Ok(()));
    gateway.expect_transfer_out().times(1).returning(|_, _| Ok(()));

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();
    engine.draw_credit(&user1(), token_id, usdc(50)).await.unwrap();

    let result = engine.repay_credit(&user1(), token_id, usdc(51)).await;
    assert!(matches!(result, Err(CreditError::RepayTooMuch { .. })));
}

#[tokio::test]
async fn test_zero_draw_skips_disbursement() {
    let mut gateway = MockGateway::new();
    gateway.expect_transfer_in().times(1).returning(|_, _| Ok(()));
    gateway.expect_transfer_out().never();

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();

    let used = engine.draw_credit(&user1(), token_id, Usdc::ZERO).await.unwrap();
    assert_eq!(used, Usdc::ZERO);
}

#[tokio::test]
async fn test_refused_draw_never_reaches_gateway() {
    let mut gateway = MockGateway::new();
    gateway.expect_transfer_in().returning(|_, _| Ok(()));
    gateway.expect_transfer_out().never();

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();

    let result = engine.draw_credit(&user1(), token_id, usdc(1001)).await;
    assert!(matches!(result, Err(CreditError::ExceedsCreditLimit { .. })));

    let stranger = AccountId::from("stranger");
    let result = engine.draw_credit(&stranger, token_id, usdc(1)).await;
    assert!(matches!(result, Err(CreditError::NotOwner { .. })));
}

#[tokio::test]
async fn test_failed_forwarding_leaves_draw_in_place() {
    let mut gateway = MockGateway::new();
    gateway.expect_transfer_in().returning(|_, _| Ok(()));
    gateway
        .expect_transfer_out()
        .with(eq(user1()), eq(usdc(80)))
        .times(1)
        .returning(|_, _| Ok(()));
    gateway
        .expect_transfer()
        .times(1)
        .returning(|_, _, _| Err(TransferError::Rejected("recipient blocked".to_string())));

    let (engine, _clock) = engine_with_gateway(Arc::new(gateway));
    let engine = Arc::new(engine);
    let token_id = engine.stake_and_mint(&user1()).await.unwrap();
    let payments = CardPayments::new(engine.clone());

    let result = payments
        .make_payment(&user1(), token_id, &user2(), usdc(80))
        .await;

    assert_eq!(
        result,
        Err(CreditError::ForwardingFailed {
            used_credit: usdc(80),
            reason: TransferError::Rejected("recipient blocked".to_string()),
        })
    );
    let line = engine.get_credit_data(token_id).await.unwrap();
    assert_eq!(line.used_credit, usdc(80));
}
