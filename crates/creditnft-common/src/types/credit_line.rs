//! CreditLine - Collateralised revolving credit record
//!
//! One line exists per owner. Its state transitions are:
//! - `draw`: raise `used_credit` up to `credit_limit`
//! - `repay`: lower `used_credit` and adjust the score
//! - `roll_over`: at most once per check, charge interest and a score penalty
//!   when a billing cycle has elapsed with an outstanding balance
//!
//! The methods mutate in place and leave the record untouched when they fail,
//! so callers can run them on a copy and commit only after settlement.

use serde::{Deserialize, Serialize};

use crate::error::CreditError;
use crate::types::amount::Usdc;
use crate::types::credit_score::{CreditScore, REPAYMENT_REWARD, REPAYMENT_SHORTFALL};
use crate::types::ids::AccountId;
use crate::{BILLING_CYCLE_DAYS, DEFAULT_INTEREST_RATE, DEFAULT_LATE_PAYMENT_PENALTY, MILLIS_PER_DAY};

/// Terms applied when a billing cycle rolls over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTerms {
    /// Interest per missed cycle, whole percent of the outstanding balance
    pub interest_rate: u32,
    /// Score points removed per missed cycle
    pub late_payment_penalty: u32,
    /// Cycle length in milliseconds
    pub cycle_period_ms: i64,
}

impl Default for CycleTerms {
    fn default() -> Self {
        Self {
            interest_rate: DEFAULT_INTEREST_RATE,
            late_payment_penalty: DEFAULT_LATE_PAYMENT_PENALTY,
            cycle_period_ms: BILLING_CYCLE_DAYS * MILLIS_PER_DAY,
        }
    }
}

impl CycleTerms {
    /// Whether a cycle that started at `last_reset` has ended by `now`
    #[inline]
    pub fn is_due(&self, last_reset: i64, now: i64) -> bool {
        now >= last_reset.saturating_add(self.cycle_period_ms)
    }
}

/// Result of a cycle rollover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollover {
    /// Interest added to the balance (zero when nothing was owed)
    pub interest: Usdc,
    /// Score points actually removed
    pub score_penalty: u32,
    /// Balance after the interest charge
    pub used_credit: Usdc,
    /// Score after the penalty
    pub credit_score: CreditScore,
    /// Start of the cycle that just ended
    pub previous_reset: i64,
    /// Start of the new cycle
    pub reset_at: i64,
}

/// Result of a successful repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub used_credit: Usdc,
    pub previous_score: CreditScore,
    pub credit_score: CreditScore,
    /// True if the repayment covered at least half of the remaining balance
    pub rewarded: bool,
}

/// Credit line owned by a single account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLine {
    /// Controlling account, immutable after mint
    pub owner: AccountId,
    /// Maximum outstanding balance a draw may reach
    pub credit_limit: Usdc,
    /// Outstanding balance
    pub used_credit: Usdc,
    pub credit_score: CreditScore,
    /// Start of the current billing cycle (Unix milliseconds)
    pub last_reset: i64,
    /// Collateral locked at mint
    pub staked_amount: Usdc,
}

impl CreditLine {
    /// A fresh line with nothing drawn and the initial score
    pub fn open(owner: AccountId, credit_limit: Usdc, staked_amount: Usdc, now: i64) -> Self {
        Self {
            owner,
            credit_limit,
            used_credit: Usdc::ZERO,
            credit_score: CreditScore::default(),
            last_reset: now,
            staked_amount,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        &self.owner == account
    }

    /// Remaining headroom. Zero if interest has pushed the balance past the limit.
    #[inline]
    pub fn available_credit(&self) -> Usdc {
        self.credit_limit.saturating_sub(self.used_credit)
    }

    /// Apply a single cycle rollover if one is due.
    ///
    /// Only one cycle is charged per call no matter how many have elapsed;
    /// `last_reset` jumps straight to `now`.
    pub fn roll_over(&mut self, now: i64, terms: &CycleTerms) -> Result<Option<Rollover>, CreditError> {
        if !terms.is_due(self.last_reset, now) {
            return Ok(None);
        }

        let mut interest = Usdc::ZERO;
        let mut score_penalty = 0;
        let mut used_credit = self.used_credit;
        let mut credit_score = self.credit_score;

        if !self.used_credit.is_zero() {
            interest = used_credit
                .percent(terms.interest_rate)
                .ok_or(CreditError::Overflow)?;
            used_credit = used_credit
                .checked_add(interest)
                .ok_or(CreditError::Overflow)?;
            credit_score = credit_score.lower(terms.late_payment_penalty);
            score_penalty = self.credit_score.value() - credit_score.value();
        }

        let rollover = Rollover {
            interest,
            score_penalty,
            used_credit,
            credit_score,
            previous_reset: self.last_reset,
            reset_at: now,
        };

        self.used_credit = used_credit;
        self.credit_score = credit_score;
        self.last_reset = now;
        Ok(Some(rollover))
    }

    /// Raise the balance by `amount`, refusing to pass the limit
    pub fn draw(&mut self, amount: Usdc) -> Result<Usdc, CreditError> {
        let new_used = self
            .used_credit
            .checked_add(amount)
            .ok_or(CreditError::Overflow)?;

        if new_used > self.credit_limit {
            return Err(CreditError::ExceedsCreditLimit {
                requested: amount,
                available: self.available_credit(),
            });
        }

        self.used_credit = new_used;
        Ok(new_used)
    }

    /// Check a repayment without applying it
    pub fn check_repayment(&self, amount: Usdc) -> Result<(), CreditError> {
        if amount > self.used_credit {
            return Err(CreditError::RepayTooMuch {
                amount,
                outstanding: self.used_credit,
            });
        }
        Ok(())
    }

    /// Lower the balance by `amount`, then score the repayment against the
    /// half of what remains after the subtraction.
    pub fn repay(&mut self, amount: Usdc, score_ceiling: u32) -> Result<RepaymentOutcome, CreditError> {
        self.check_repayment(amount)?;

        let used_credit = self
            .used_credit
            .checked_sub(amount)
            .ok_or(CreditError::Overflow)?;
        let previous_score = self.credit_score;

        // Compared against the post-repayment balance, not the prior one.
        let rewarded = amount >= used_credit.half();
        let credit_score = if rewarded {
            previous_score.raise(REPAYMENT_REWARD, score_ceiling)
        } else {
            previous_score.lower(REPAYMENT_SHORTFALL)
        };

        self.used_credit = used_credit;
        self.credit_score = credit_score;

        Ok(RepaymentOutcome {
            used_credit,
            previous_score,
            credit_score,
            rewarded,
        })
    }
}
