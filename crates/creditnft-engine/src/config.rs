//! Engine configuration

use creditnft_common::{
    types::credit_score::{INITIAL_SCORE, MAX_SCORE},
    CreditNftError, CycleTerms, Result, Usdc, BILLING_CYCLE_DAYS, DEFAULT_BASE_CREDIT_LIMIT,
    DEFAULT_INTEREST_RATE, DEFAULT_LATE_PAYMENT_PENALTY, DEFAULT_STAKING_REQUIREMENT,
    MILLIS_PER_DAY,
};
use serde::{Deserialize, Serialize};

/// Credit line engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Limit granted to every freshly minted line
    pub base_credit_limit: Usdc,
    /// Collateral collected by `stake_and_mint`
    pub staking_requirement: Usdc,
    /// Interest per missed cycle, whole percent
    pub interest_rate: u32,
    /// Score points removed per missed cycle
    pub late_payment_penalty: u32,
    /// Billing cycle length in days
    pub cycle_period_days: u32,
    /// Score of a freshly minted line
    pub initial_credit_score: u32,
    /// Score ceiling
    pub max_credit_score: u32,
    /// Capacity of the lifecycle event channel
    pub event_buffer: usize,
    /// Account allowed to change interest rate and penalty
    pub admin_account: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_credit_limit: DEFAULT_BASE_CREDIT_LIMIT,
            staking_requirement: DEFAULT_STAKING_REQUIREMENT,
            interest_rate: DEFAULT_INTEREST_RATE,
            late_payment_penalty: DEFAULT_LATE_PAYMENT_PENALTY,
            cycle_period_days: BILLING_CYCLE_DAYS as u32,
            initial_credit_score: INITIAL_SCORE,
            max_credit_score: MAX_SCORE,
            event_buffer: crate::DEFAULT_EVENT_BUFFER,
            admin_account: "admin".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `.env` and `CREDITNFT_*` environment variables.
    ///
    /// Unparsable values are ignored and the default kept.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("CREDITNFT_BASE_CREDIT_LIMIT").and_then(|v| v.parse().ok()) {
            cfg.base_credit_limit = v;
        }
        if let Some(v) = lookup("CREDITNFT_STAKING_REQUIREMENT").and_then(|v| v.parse().ok()) {
            cfg.staking_requirement = v;
        }
        if let Some(v) = lookup("CREDITNFT_INTEREST_RATE").and_then(|v| v.parse().ok()) {
            cfg.interest_rate = v;
        }
        if let Some(v) = lookup("CREDITNFT_LATE_PAYMENT_PENALTY").and_then(|v| v.parse().ok()) {
            cfg.late_payment_penalty = v;
        }
        if let Some(v) = lookup("CREDITNFT_CYCLE_PERIOD_DAYS").and_then(|v| v.parse().ok()) {
            cfg.cycle_period_days = v;
        }
        if let Some(v) = lookup("CREDITNFT_INITIAL_CREDIT_SCORE").and_then(|v| v.parse().ok()) {
            cfg.initial_credit_score = v;
        }
        if let Some(v) = lookup("CREDITNFT_MAX_CREDIT_SCORE").and_then(|v| v.parse().ok()) {
            cfg.max_credit_score = v;
        }
        if let Some(v) = lookup("CREDITNFT_EVENT_BUFFER").and_then(|v| v.parse().ok()) {
            cfg.event_buffer = v;
        }
        if let Some(v) = lookup("CREDITNFT_ADMIN_ACCOUNT") {
            cfg.admin_account = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.cycle_period_days == 0 {
            return Err(CreditNftError::Config(
                "cycle_period_days must be at least 1".to_string(),
            ));
        }
        if self.initial_credit_score > self.max_credit_score {
            return Err(CreditNftError::Config(format!(
                "initial_credit_score {} exceeds max_credit_score {}",
                self.initial_credit_score, self.max_credit_score
            )));
        }
        if self.event_buffer == 0 {
            return Err(CreditNftError::Config("event_buffer must be positive".to_string()));
        }
        if self.admin_account.is_empty() {
            return Err(CreditNftError::Config("admin_account must not be empty".to_string()));
        }
        Ok(())
    }

    /// Rollover terms derived from this configuration
    pub fn cycle_terms(&self) -> CycleTerms {
        CycleTerms {
            interest_rate: self.interest_rate,
            late_payment_penalty: self.late_payment_penalty,
            cycle_period_ms: i64::from(self.cycle_period_days) * MILLIS_PER_DAY,
        }
    }
}
