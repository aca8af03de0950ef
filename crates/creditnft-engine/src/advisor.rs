//! CreditAdvisor - Dashboard policy helpers
//!
//! Pure functions over credit line state: recommended limits, due dates,
//! minimum payments and score predictions. None of them mutate a line;
//! the limit recommendation is advisory and is not applied by the engine.

use chrono::{DateTime, TimeZone, Utc};
use creditnft_common::{
    types::credit_score::{MAX_SCORE, POLICY_FLOOR},
    AccountId, CreditError, CreditLine, CreditScore, TokenId, Usdc, BILLING_CYCLE_DAYS,
    MILLIS_PER_DAY,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::engine::CreditLineEngine;

/// Limit multiplier applied to the stake at the middle of the score band
pub const CREDIT_LIMIT_MULTIPLIER: f64 = 2.0;

/// Minimum payment as a percentage of the outstanding balance
pub const MINIMUM_PAYMENT_PERCENT: u32 = 10;

/// Everything a dashboard shows for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSummary {
    pub owner: AccountId,
    pub has_line: bool,
    pub token_id: Option<TokenId>,
    pub credit_data: Option<CreditLine>,
    pub available_credit: Option<Usdc>,
    pub wallet_balance: Usdc,
    pub minimum_payment: Option<Usdc>,
    /// Unix milliseconds
    pub payment_due_at: Option<i64>,
}

/// Stateless policy calculations
pub struct CreditAdvisor;

impl CreditAdvisor {
    /// Limit for a stake given the score: stake × 2 × factor, where the factor
    /// runs from 0.5 at score 300 to 1.5 at score 850.
    pub fn recommended_credit_limit(stake: Usdc, score: CreditScore) -> Result<Usdc, CreditError> {
        let factor = 0.5 + score.band_position();
        let percent = (CREDIT_LIMIT_MULTIPLIER * factor * 100.0).floor() as u64;
        stake.mul_ratio(percent, 100).ok_or(CreditError::Overflow)
    }

    /// End of the billing cycle that started at `last_reset`
    pub fn payment_due_at(last_reset: i64) -> i64 {
        last_reset.saturating_add(BILLING_CYCLE_DAYS * MILLIS_PER_DAY)
    }

    /// Due date as a calendar timestamp
    pub fn payment_due_date(last_reset: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(Self::payment_due_at(last_reset)).single()
    }

    /// 10% of the outstanding balance, rounded down
    pub fn minimum_payment(used_credit: Usdc) -> Usdc {
        used_credit
            .percent(MINIMUM_PAYMENT_PERCENT)
            .unwrap_or(used_credit)
    }

    pub fn is_past_due(last_reset: i64, now: i64) -> bool {
        now > Self::payment_due_at(last_reset)
    }

    /// Whole days left until the due date, rounded up, never negative
    pub fn days_until_due(last_reset: i64, now: i64) -> i64 {
        let remaining = Self::payment_due_at(last_reset) - now;
        if remaining <= 0 {
            return 0;
        }
        (remaining + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }

    /// Expected score after paying `payment` toward `used_credit`.
    ///
    /// This is the dashboard's gentler estimate, judged against the balance
    /// before payment and bounded to the 300..=850 band; the engine's own
    /// scoring rule is applied by `repay_credit`.
    pub fn predict_score(score: CreditScore, used_credit: Usdc, payment: Usdc) -> CreditScore {
        let value = score.value();
        let predicted = if payment >= used_credit.half() {
            value.saturating_add(5).min(MAX_SCORE)
        } else if !payment.is_zero() {
            value.saturating_add(1).min(MAX_SCORE)
        } else {
            value.saturating_sub(2).max(POLICY_FLOOR)
        };
        CreditScore::new(predicted)
    }

    /// Gather the dashboard view for `owner`. Applies any due rollover.
    #[instrument(skip(engine))]
    pub async fn credit_summary(
        engine: &CreditLineEngine,
        owner: &AccountId,
    ) -> Result<CreditSummary, CreditError> {
        let token_id = engine.get_token_id(owner);

        let (credit_data, available_credit) = match token_id {
            Some(token_id) => {
                let available = engine.get_available_credit(token_id).await?;
                let data = engine.get_credit_data(token_id).await?;
                (Some(data), Some(available))
            }
            None => (None, None),
        };

        let wallet_balance = engine.gateway().balance_of(owner).await?;

        Ok(CreditSummary {
            owner: owner.clone(),
            has_line: token_id.is_some(),
            token_id,
            minimum_payment: credit_data
                .as_ref()
                .map(|line| Self::minimum_payment(line.used_credit)),
            payment_due_at: credit_data
                .as_ref()
                .map(|line| Self::payment_due_at(line.last_reset)),
            credit_data,
            available_credit,
            wallet_balance,
        })
    }
}
