//! CreditScore - Repayment reputation of a credit line
//!
//! The score starts at 700, moves up on large repayments, down on small ones
//! and on missed billing cycles. It never goes below 0 and never above the
//! product ceiling (850).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Score assigned to a freshly minted line
pub const INITIAL_SCORE: u32 = 700;

/// Product ceiling
pub const MAX_SCORE: u32 = 850;

/// Hard floor
pub const MIN_SCORE: u32 = 0;

/// Lower bound of the band used by limit and prediction policies
pub const POLICY_FLOOR: u32 = 300;

/// Points gained by a repayment covering at least half the remaining balance
pub const REPAYMENT_REWARD: u32 = 5;

/// Points lost by a repayment smaller than half the remaining balance
pub const REPAYMENT_SHORTFALL: u32 = 2;

/// Clamped credit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditScore(u32);

impl Default for CreditScore {
    fn default() -> Self {
        Self(INITIAL_SCORE)
    }
}

impl CreditScore {
    pub const fn new(score: u32) -> Self {
        Self(score)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Raise by `points`, never past `ceiling`
    pub fn raise(self, points: u32, ceiling: u32) -> Self {
        Self(self.0.saturating_add(points).min(ceiling))
    }

    /// Lower by `points`, clamping at zero
    pub fn lower(self, points: u32) -> Self {
        Self(self.0.saturating_sub(points))
    }

    /// Score normalised to `[0.0, 1.0]` within the policy band
    pub fn band_position(self) -> f64 {
        let clamped = self.0.clamp(POLICY_FLOOR, MAX_SCORE);
        f64::from(clamped - POLICY_FLOOR) / f64::from(MAX_SCORE - POLICY_FLOOR)
    }
}

impl fmt::Display for CreditScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}
