//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use creditnft_common::{AccountId, CreditNftError, Usdc};
use creditnft_engine::{
    CreditLineEngine, EngineConfig, InMemoryEscrow, ManualClock, OwnerAuthorization,
    PaymentGateway,
};

/// Start of the simulated timeline (2024-01-01T00:00:00Z)
pub const GENESIS_MS: i64 = 1_704_067_200_000;

pub fn deployer() -> AccountId {
    AccountId::from("deployer")
}

pub fn user1() -> AccountId {
    AccountId::from("user1")
}

pub fn user2() -> AccountId {
    AccountId::from("user2")
}

pub fn usdc(whole: u64) -> Usdc {
    Usdc::from_whole(whole)
}

pub struct Harness {
    pub engine: Arc<CreditLineEngine>,
    pub escrow: Arc<InMemoryEscrow>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Escrow with lending liquidity, two users holding 10,000 USDC each
    pub fn new() -> Self {
        Self::with_config(EngineConfig {
            admin_account: deployer().to_string(),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, CreditNftError> {
        let escrow = Arc::new(InMemoryEscrow::with_liquidity(usdc(1_000_000)));
        escrow.fund(&user1(), usdc(10_000));
        escrow.fund(&user2(), usdc(10_000));

        let clock = Arc::new(ManualClock::new(GENESIS_MS));
        let engine = CreditLineEngine::new(
            &config,
            escrow.clone(),
            Arc::new(OwnerAuthorization::new(config.admin_account.clone())),
        )?
        .with_clock(clock.clone());

        Ok(Self {
            engine: Arc::new(engine),
            escrow,
            clock,
        })
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(chrono::Duration::days(days));
    }
}

/// Engine over an arbitrary gateway on a manual clock
pub fn engine_with_gateway(gateway: Arc<dyn PaymentGateway>) -> (CreditLineEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(GENESIS_MS));
    let engine = CreditLineEngine::new(
        &EngineConfig::default(),
        gateway,
        Arc::new(OwnerAuthorization::new("admin")),
    )
    .unwrap()
    .with_clock(clock.clone());
    (engine, clock)
}
