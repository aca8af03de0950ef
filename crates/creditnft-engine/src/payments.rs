//! Card payments - pay a merchant from a credit line
//!
//! A card payment is a draw to the payer followed by a wallet transfer to the
//! recipient. The two steps settle separately: if the forward transfer fails
//! the draw stands, the funds stay in the payer's wallet and the caller gets
//! `CreditError::ForwardingFailed` carrying the committed balance.

use std::sync::Arc;

use creditnft_common::{AccountId, CreditError, TokenId, Usdc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::engine::CreditLineEngine;

/// Settled card payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub id: Uuid,
    pub token_id: TokenId,
    pub payer: AccountId,
    pub recipient: AccountId,
    pub amount: Usdc,
    /// Balance of the line after the draw
    pub used_credit: Usdc,
    pub settled_at: i64,
}

/// Payment flows on top of the credit line engine
pub struct CardPayments {
    engine: Arc<CreditLineEngine>,
}

impl CardPayments {
    pub fn new(engine: Arc<CreditLineEngine>) -> Self {
        Self { engine }
    }

    /// Pay `recipient` with credit drawn from `token_id`
    #[instrument(skip(self))]
    pub async fn make_payment(
        &self,
        payer: &AccountId,
        token_id: TokenId,
        recipient: &AccountId,
        amount: Usdc,
    ) -> Result<PaymentReceipt, CreditError> {
        // Ownership first: a stranger must not trigger the line's rollover.
        let line = self.engine.get_credit_data(token_id).await?;
        if !line.is_owned_by(payer) {
            warn!(token_id = %token_id, payer = %payer, "Payment refused, caller does not own credit line");
            return Err(CreditError::NotOwner {
                caller: payer.clone(),
                token_id,
            });
        }

        let available = self.engine.get_available_credit(token_id).await?;
        if available < amount {
            warn!(token_id = %token_id, amount = %amount, available = %available, "Not enough available credit");
            return Err(CreditError::ExceedsCreditLimit {
                requested: amount,
                available,
            });
        }

        let used_credit = self.engine.draw_credit(payer, token_id, amount).await?;

        if let Err(reason) = self.engine.gateway().transfer(payer, recipient, amount).await {
            warn!(
                token_id = %token_id,
                payer = %payer,
                recipient = %recipient,
                used_credit = %used_credit,
                "Credit drawn but forwarding failed: {}",
                reason
            );
            return Err(CreditError::ForwardingFailed {
                used_credit,
                reason,
            });
        }

        let receipt = PaymentReceipt {
            id: Uuid::now_v7(),
            token_id,
            payer: payer.clone(),
            recipient: recipient.clone(),
            amount,
            used_credit,
            settled_at: self.engine.now_millis(),
        };
        info!(receipt = %receipt.id, token_id = %token_id, amount = %amount, "Card payment settled");
        Ok(receipt)
    }

    /// Move wallet funds without touching credit
    #[instrument(skip(self))]
    pub async fn transfer_usdc(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Usdc,
    ) -> Result<(), CreditError> {
        self.engine.gateway().transfer(from, to, amount).await?;
        Ok(())
    }
}
