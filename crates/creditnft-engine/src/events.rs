//! Credit line lifecycle events
//!
//! Published on a broadcast channel for dashboards and indexers. Having no
//! subscriber is not an error.

use creditnft_common::{AccountId, CreditScore, TokenId, Usdc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something that happened to a credit line or to the engine terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreditEvent {
    Minted {
        token_id: TokenId,
        owner: AccountId,
        credit_limit: Usdc,
        staked_amount: Usdc,
    },
    Drawn {
        token_id: TokenId,
        amount: Usdc,
        used_credit: Usdc,
    },
    Repaid {
        token_id: TokenId,
        amount: Usdc,
        used_credit: Usdc,
        credit_score: CreditScore,
    },
    CycleRolledOver {
        token_id: TokenId,
        interest: Usdc,
        score_penalty: u32,
        used_credit: Usdc,
        credit_score: CreditScore,
        reset_at: i64,
    },
    InterestRateChanged {
        previous: u32,
        current: u32,
    },
    LatePenaltyChanged {
        previous: u32,
        current: u32,
    },
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    /// Engine clock time (Unix milliseconds)
    pub timestamp: i64,
    pub event: CreditEvent,
}

impl EventRecord {
    pub fn new(timestamp: i64, event: CreditEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp,
            event,
        }
    }

    /// Token the event concerns, if any
    pub fn token_id(&self) -> Option<TokenId> {
        match &self.event {
            CreditEvent::Minted { token_id, .. }
            | CreditEvent::Drawn { token_id, .. }
            | CreditEvent::Repaid { token_id, .. }
            | CreditEvent::CycleRolledOver { token_id, .. } => Some(*token_id),
            CreditEvent::InterestRateChanged { .. } | CreditEvent::LatePenaltyChanged { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let record = EventRecord::new(
            0,
            CreditEvent::Drawn {
                token_id: TokenId(1),
                amount: Usdc::from_whole(200),
                used_credit: Usdc::from_whole(200),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"]["type"], "drawn");
        assert_eq!(json["event"]["amount"], 200_000_000u64);
        assert_eq!(record.token_id(), Some(TokenId(1)));
    }
}
