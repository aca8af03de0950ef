//! Error types for CreditNFT
//!
//! Domain errors of the credit-line state machine plus a unified error type
//! for the services built around it.

use thiserror::Error;

use crate::types::amount::{AmountError, Usdc};
use crate::types::ids::{AccountId, TokenId};

/// Result type alias using CreditNftError
pub type Result<T> = std::result::Result<T, CreditNftError>;

/// Unified error type for CreditNFT services
#[derive(Debug, Error)]
pub enum CreditNftError {
    #[error("Credit error: {0}")]
    Credit(#[from] CreditError),

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of the credit-line state machine.
///
/// Every failure leaves the credit line exactly as it was before the call,
/// except `ForwardingFailed`, which reports a draw that stands.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreditError {
    #[error("Account {owner} already staked for a credit line")]
    AlreadyStaked { owner: AccountId },

    #[error("Exceeds credit limit: requested {requested}, available {available}")]
    ExceedsCreditLimit { requested: Usdc, available: Usdc },

    #[error("Repay too much: amount {amount} > outstanding {outstanding}")]
    RepayTooMuch { amount: Usdc, outstanding: Usdc },

    #[error("Credit line not found: {0}")]
    NotFound(TokenId),

    #[error("Account {caller} is not the owner of credit line {token_id}")]
    NotOwner { caller: AccountId, token_id: TokenId },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// The draw committed but the funds never reached the recipient; they
    /// remain in the payer's wallet.
    #[error("Credit drawn (used {used_credit}) but forwarding failed: {reason}")]
    ForwardingFailed {
        used_credit: Usdc,
        reason: TransferError,
    },

    #[error("Account {0} is not authorized for this operation")]
    Unauthorized(AccountId),

    #[error("Amount arithmetic overflow")]
    Overflow,
}

/// Reasons a payment gateway can refuse to move funds
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient funds: required {required}, balance {balance}")]
    InsufficientFunds { required: Usdc, balance: Usdc },

    #[error("Insufficient escrow: required {required}, escrow {escrow}")]
    InsufficientEscrow { required: Usdc, escrow: Usdc },

    #[error("Transfer rejected: {0}")]
    Rejected(String),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for CreditNftError {
    fn from(err: serde_json::Error) -> Self {
        CreditNftError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CreditNftError {
    fn from(err: std::io::Error) -> Self {
        CreditNftError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for CreditNftError {
    fn from(err: anyhow::Error) -> Self {
        CreditNftError::Internal(err.to_string())
    }
}
