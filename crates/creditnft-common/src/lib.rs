//! # CreditNFT Common
//!
//! Shared types and errors for the CreditNFT collateralised credit line.
//!
//! ## Core Types
//!
//! - [`Usdc`]: six-decimal fixed-point amount (1 USDC = 1,000,000 units)
//! - [`AccountId`] / [`TokenId`]: owner identity and credit instrument id
//! - [`CreditLine`]: per-owner record with limit, usage, score and cycle state
//! - [`CreditScore`]: clamped repayment reputation
//!
//! ## Errors
//!
//! - [`CreditError`]: domain failures of the credit-line state machine
//! - [`TransferError`]: failure reasons reported by a payment gateway
//! - [`CreditNftError`]: unified error for services and binaries

pub mod error;
pub mod types;

pub use error::{CreditError, CreditNftError, Result, TransferError};
pub use types::{
    amount::{AmountError, Usdc, USDC_DECIMALS, USDC_SCALE},
    credit_line::{CreditLine, CycleTerms, RepaymentOutcome, Rollover},
    credit_score::CreditScore,
    ids::{AccountId, TokenId},
};

/// CreditNFT version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collateral locked by `stake_and_mint` (500 USDC)
pub const DEFAULT_STAKING_REQUIREMENT: Usdc = Usdc::from_whole(500);

/// Credit limit granted to a freshly minted line (1000 USDC)
pub const DEFAULT_BASE_CREDIT_LIMIT: Usdc = Usdc::from_whole(1000);

/// Interest charged per missed cycle, in whole percent of the outstanding balance
pub const DEFAULT_INTEREST_RATE: u32 = 5;

/// Score points removed when a cycle rolls over with an outstanding balance
pub const DEFAULT_LATE_PAYMENT_PENALTY: u32 = 50;

/// Billing cycle length in days
pub const BILLING_CYCLE_DAYS: i64 = 30;

/// Milliseconds per day
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
