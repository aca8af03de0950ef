//! CreditNFT simulator
//!
//! Runs the credit line lifecycle against an in-process escrow and a manual
//! clock, then prints the final engine state as JSON.

use std::sync::Arc;

use anyhow::Result;
use creditnft_common::{AccountId, Usdc, VERSION};
use creditnft_engine::{
    CardPayments, CreditAdvisor, CreditLineEngine, EngineConfig, InMemoryEscrow, ManualClock,
    OwnerAuthorization,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting CreditNFT simulator v{}", VERSION);

    let config = EngineConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let escrow = Arc::new(InMemoryEscrow::with_liquidity(Usdc::from_whole(1_000_000)));
    let clock = Arc::new(ManualClock::starting_now());
    let admin = AccountId::new(config.admin_account.clone());
    let engine = Arc::new(
        CreditLineEngine::new(
            &config,
            escrow.clone(),
            Arc::new(OwnerAuthorization::new(admin.clone())),
        )?
        .with_clock(clock.clone()),
    );
    let payments = CardPayments::new(engine.clone());

    let user = AccountId::from("user1");
    let merchant = AccountId::from("merchant");
    escrow.fund(&user, Usdc::from_whole(10_000));

    let token_id = engine.stake_and_mint(&user).await?;
    info!(token_id = %token_id, "Minted credit line for {}", user);

    engine.draw_credit(&user, token_id, Usdc::from_whole(200)).await?;
    if let Err(err) = engine.draw_credit(&user, token_id, Usdc::from_whole(801)).await {
        info!("Overdraw refused as expected: {}", err);
    }

    engine.repay_credit(&user, token_id, Usdc::from_whole(150)).await?;

    let receipt = payments
        .make_payment(&user, token_id, &merchant, Usdc::from_whole(50))
        .await?;
    info!(receipt = %receipt.id, "Paid {} {}", merchant, receipt.amount);

    clock.advance(chrono::Duration::days(31));
    engine.draw_credit(&user, token_id, Usdc::ZERO).await?;

    if let Err(err) = engine.set_interest_rate(&user, 10) {
        warn!("Non-admin rate change refused: {}", err);
    }
    engine.set_interest_rate(&admin, 10)?;

    let summary = CreditAdvisor::credit_summary(&engine, &user).await?;
    info!(
        "Summary: available={:?}, minimum payment={:?}, wallet={}",
        summary.available_credit, summary.minimum_payment, summary.wallet_balance
    );

    let snapshot = engine.snapshot().await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    info!("Simulation complete");
    Ok(())
}
