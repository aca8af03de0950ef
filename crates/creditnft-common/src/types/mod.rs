//! Core data types for CreditNFT

pub mod amount;
pub mod credit_line;
pub mod credit_score;
pub mod ids;
