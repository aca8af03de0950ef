//! USDC amounts as six-decimal fixed-point integers
//!
//! Every balance in the credit line is an integer count of the smallest USDC
//! unit (1e-6). Conversion to and from human-readable decimals goes through
//! `rust_decimal` so no float ever touches a balance.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places carried by USDC
pub const USDC_DECIMALS: u32 = 6;

/// Smallest units per whole USDC
pub const USDC_SCALE: u64 = 1_000_000;

/// Amount parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount out of range")]
    OutOfRange,
}

/// A USDC amount in smallest units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usdc(u64);

impl Usdc {
    pub const ZERO: Usdc = Usdc(0);

    /// Amount from raw smallest units
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Amount from whole USDC, saturating at `u64::MAX` units
    #[inline]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole.saturating_mul(USDC_SCALE))
    }

    /// Raw smallest units
    #[inline]
    pub const fn units(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Usdc) -> Option<Usdc> {
        self.0.checked_add(rhs.0).map(Usdc)
    }

    pub fn checked_sub(self, rhs: Usdc) -> Option<Usdc> {
        self.0.checked_sub(rhs.0).map(Usdc)
    }

    pub fn saturating_sub(self, rhs: Usdc) -> Usdc {
        Usdc(self.0.saturating_sub(rhs.0))
    }

    /// Half of the amount, rounding toward zero
    #[inline]
    pub fn half(self) -> Usdc {
        Usdc(self.0 / 2)
    }

    /// `floor(self * percent / 100)`, or `None` if the result does not fit
    pub fn percent(self, percent: u32) -> Option<Usdc> {
        let scaled = u128::from(self.0) * u128::from(percent) / 100;
        u64::try_from(scaled).ok().map(Usdc)
    }

    /// `floor(self * numerator / denominator)`; `None` on overflow or zero denominator
    pub fn mul_ratio(self, numerator: u64, denominator: u64) -> Option<Usdc> {
        if denominator == 0 {
            return None;
        }
        let scaled = u128::from(self.0) * u128::from(numerator) / u128::from(denominator);
        u64::try_from(scaled).ok().map(Usdc)
    }

    /// Amount as a decimal number of whole USDC
    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), USDC_DECIMALS)
    }

    /// Convert a decimal number of whole USDC, truncating digits past the sixth decimal
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        let truncated = value.round_dp_with_strategy(USDC_DECIMALS, RoundingStrategy::ToZero);
        let units = truncated
            .checked_mul(Decimal::from(USDC_SCALE))
            .ok_or(AmountError::OutOfRange)?;
        units.to_u64().map(Usdc).ok_or(AmountError::OutOfRange)
    }
}

impl fmt::Display for Usdc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Usdc {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value =
            Decimal::from_str(trimmed).map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        Self::from_decimal(value)
    }
}

/// Format an amount with all six decimals, e.g. `"12.500000"`
pub fn format_usdc(amount: Usdc) -> String {
    amount.to_string()
}

/// Parse a human-readable decimal string into an amount
pub fn parse_usdc(input: &str) -> Result<Usdc, AmountError> {
    input.parse()
}
