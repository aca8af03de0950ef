//! CreditLineEngine - Stake, draw, repay and billing-cycle rollover
//!
//! Concurrency model:
//! - each line sits behind its own async mutex, held across the gateway call,
//!   so operations on one token are serialised while different tokens run in
//!   parallel
//! - mints are serialised by the mint lock, which also owns the next token id
//! - every mutation is computed on a copy and committed only after the
//!   gateway confirms the transfer it depends on

use std::sync::Arc;

use creditnft_common::{
    AccountId, CreditError, CreditLine, CreditNftError, CreditScore, CycleTerms, Rollover, TokenId,
    Usdc,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::auth::AuthorizationCheck;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::events::{CreditEvent, EventRecord};
use crate::gateway::PaymentGateway;

type LineHandle = Arc<Mutex<CreditLine>>;

/// Owner of every credit line record
pub struct CreditLineEngine {
    lines: DashMap<TokenId, LineHandle>,
    owners: DashMap<AccountId, TokenId>,
    /// Serialises mints; holds the next token id to allocate
    mint_lock: Mutex<TokenId>,
    terms: RwLock<CycleTerms>,
    base_credit_limit: Usdc,
    staking_requirement: Usdc,
    initial_credit_score: CreditScore,
    max_credit_score: u32,
    gateway: Arc<dyn PaymentGateway>,
    auth: Arc<dyn AuthorizationCheck>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<EventRecord>,
}

/// One line in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub token_id: TokenId,
    pub line: CreditLine,
}

/// Point-in-time copy of all engine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub terms: CycleTerms,
    pub next_token_id: TokenId,
    pub taken_at: i64,
    /// Sorted by token id
    pub lines: Vec<LineEntry>,
}

impl CreditLineEngine {
    /// Create an engine on the wall clock.
    ///
    /// Fails with `CreditNftError::Config` if `config` does not validate.
    pub fn new(
        config: &EngineConfig,
        gateway: Arc<dyn PaymentGateway>,
        auth: Arc<dyn AuthorizationCheck>,
    ) -> Result<Self, CreditNftError> {
        config.validate()?;

        let (events, _) = broadcast::channel(config.event_buffer);
        Ok(Self {
            lines: DashMap::new(),
            owners: DashMap::new(),
            mint_lock: Mutex::new(TokenId::FIRST),
            terms: RwLock::new(config.cycle_terms()),
            base_credit_limit: config.base_credit_limit,
            staking_requirement: config.staking_requirement,
            initial_credit_score: CreditScore::new(config.initial_credit_score),
            max_credit_score: config.max_credit_score,
            gateway,
            auth,
            clock: Arc::new(SystemClock),
            events,
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Receive lifecycle events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    pub fn gateway(&self) -> &Arc<dyn PaymentGateway> {
        &self.gateway
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Lock collateral and open a credit line for `owner`
    #[instrument(skip(self))]
    pub async fn stake_and_mint(&self, owner: &AccountId) -> Result<TokenId, CreditError> {
        let mut next_id = self.mint_lock.lock().await;

        if self.owners.contains_key(owner) {
            warn!(owner = %owner, "Mint refused, account already staked");
            return Err(CreditError::AlreadyStaked {
                owner: owner.clone(),
            });
        }

        let token_id = *next_id;
        let following = token_id.next().ok_or(CreditError::Overflow)?;

        self.gateway
            .transfer_in(owner, self.staking_requirement)
            .await?;

        *next_id = following;

        let now = self.clock.now_millis();
        let mut line = CreditLine::open(
            owner.clone(),
            self.base_credit_limit,
            self.staking_requirement,
            now,
        );
        line.credit_score = self.initial_credit_score;

        self.lines.insert(token_id, Arc::new(Mutex::new(line)));
        self.owners.insert(owner.clone(), token_id);

        info!(
            token_id = %token_id,
            owner = %owner,
            staked = %self.staking_requirement,
            credit_limit = %self.base_credit_limit,
            "Credit line minted"
        );
        self.publish(CreditEvent::Minted {
            token_id,
            owner: owner.clone(),
            credit_limit: self.base_credit_limit,
            staked_amount: self.staking_requirement,
        });

        Ok(token_id)
    }

    /// Draw `amount` against the line and disburse it to the owner.
    ///
    /// A zero amount is valid and only applies a due cycle rollover.
    #[instrument(skip(self))]
    pub async fn draw_credit(
        &self,
        caller: &AccountId,
        token_id: TokenId,
        amount: Usdc,
    ) -> Result<Usdc, CreditError> {
        let handle = self.line_handle(token_id)?;
        let mut line = handle.lock().await;
        Self::ensure_owner(&line, caller, token_id)?;

        let terms = *self.terms.read();
        let now = self.clock.now_millis();

        let mut updated = line.clone();
        let rollover = updated.roll_over(now, &terms)?;
        let used_credit = updated.draw(amount).map_err(|err| {
            debug!(token_id = %token_id, amount = %amount, "Draw refused: {}", err);
            err
        })?;

        if !amount.is_zero() {
            self.gateway.transfer_out(caller, amount).await?;
        }

        *line = updated;
        drop(line);

        if let Some(rollover) = rollover {
            self.record_rollover(token_id, &rollover);
        }
        info!(token_id = %token_id, amount = %amount, used_credit = %used_credit, "Credit drawn");
        self.publish(CreditEvent::Drawn {
            token_id,
            amount,
            used_credit,
        });

        Ok(used_credit)
    }

    /// Collect `amount` from the owner and lower the balance.
    ///
    /// The score moves +5 if `amount` covers at least half of what remains
    /// after the repayment, otherwise -2.
    #[instrument(skip(self))]
    pub async fn repay_credit(
        &self,
        caller: &AccountId,
        token_id: TokenId,
        amount: Usdc,
    ) -> Result<Usdc, CreditError> {
        let handle = self.line_handle(token_id)?;
        let mut line = handle.lock().await;
        Self::ensure_owner(&line, caller, token_id)?;

        let mut updated = line.clone();
        let outcome = updated.repay(amount, self.max_credit_score)?;

        if !amount.is_zero() {
            self.gateway.transfer_in(caller, amount).await?;
        }

        *line = updated;
        drop(line);

        info!(
            token_id = %token_id,
            amount = %amount,
            used_credit = %outcome.used_credit,
            score = outcome.credit_score.value(),
            rewarded = outcome.rewarded,
            "Credit repaid"
        );
        self.publish(CreditEvent::Repaid {
            token_id,
            amount,
            used_credit: outcome.used_credit,
            credit_score: outcome.credit_score,
        });

        Ok(outcome.used_credit)
    }

    /// Remaining headroom after applying any due rollover
    #[instrument(skip(self))]
    pub async fn get_available_credit(&self, token_id: TokenId) -> Result<Usdc, CreditError> {
        let handle = self.line_handle(token_id)?;
        let mut line = handle.lock().await;

        let terms = *self.terms.read();
        let rollover = line.roll_over(self.clock.now_millis(), &terms)?;
        let available = line.available_credit();
        drop(line);

        if let Some(rollover) = rollover {
            self.record_rollover(token_id, &rollover);
        }
        Ok(available)
    }

    /// Copy of the stored line, without applying a rollover
    pub async fn get_credit_data(&self, token_id: TokenId) -> Result<CreditLine, CreditError> {
        let handle = self.line_handle(token_id)?;
        let line = handle.lock().await;
        Ok(line.clone())
    }

    pub fn has_line(&self, owner: &AccountId) -> bool {
        self.owners.contains_key(owner)
    }

    pub fn get_token_id(&self, owner: &AccountId) -> Option<TokenId> {
        self.owners.get(owner).map(|entry| *entry.value())
    }

    /// Collateral locked by `owner`, zero if they have no line
    pub async fn staked_amount(&self, owner: &AccountId) -> Usdc {
        let Some(token_id) = self.get_token_id(owner) else {
            return Usdc::ZERO;
        };
        match self.get_credit_data(token_id).await {
            Ok(line) => line.staked_amount,
            Err(_) => Usdc::ZERO,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn interest_rate(&self) -> u32 {
        self.terms.read().interest_rate
    }

    pub fn late_payment_penalty(&self) -> u32 {
        self.terms.read().late_payment_penalty
    }

    pub fn cycle_terms(&self) -> CycleTerms {
        *self.terms.read()
    }

    pub fn base_credit_limit(&self) -> Usdc {
        self.base_credit_limit
    }

    pub fn staking_requirement(&self) -> Usdc {
        self.staking_requirement
    }

    /// Change the per-cycle interest rate (whole percent)
    #[instrument(skip(self))]
    pub fn set_interest_rate(&self, caller: &AccountId, rate: u32) -> Result<(), CreditError> {
        self.ensure_authorized(caller)?;
        let previous = {
            let mut terms = self.terms.write();
            std::mem::replace(&mut terms.interest_rate, rate)
        };
        info!(previous, current = rate, "Interest rate updated");
        self.publish(CreditEvent::InterestRateChanged {
            previous,
            current: rate,
        });
        Ok(())
    }

    /// Change the score penalty applied on a missed cycle
    #[instrument(skip(self))]
    pub fn set_late_payment_penalty(
        &self,
        caller: &AccountId,
        penalty: u32,
    ) -> Result<(), CreditError> {
        self.ensure_authorized(caller)?;
        let previous = {
            let mut terms = self.terms.write();
            std::mem::replace(&mut terms.late_payment_penalty, penalty)
        };
        info!(previous, current = penalty, "Late payment penalty updated");
        self.publish(CreditEvent::LatePenaltyChanged {
            previous,
            current: penalty,
        });
        Ok(())
    }

    /// Consistent copy of every line. Waits for in-flight operations per line.
    pub async fn snapshot(&self) -> EngineSnapshot {
        let next_token_id = *self.mint_lock.lock().await;

        let handles: Vec<(TokenId, LineHandle)> = self
            .lines
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut lines = Vec::with_capacity(handles.len());
        for (token_id, handle) in handles {
            let line = handle.lock().await.clone();
            lines.push(LineEntry { token_id, line });
        }
        lines.sort_by_key(|entry| entry.token_id);

        EngineSnapshot {
            terms: self.cycle_terms(),
            next_token_id,
            taken_at: self.clock.now_millis(),
            lines,
        }
    }

    fn line_handle(&self, token_id: TokenId) -> Result<LineHandle, CreditError> {
        self.lines
            .get(&token_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(CreditError::NotFound(token_id))
    }

    fn ensure_owner(
        line: &CreditLine,
        caller: &AccountId,
        token_id: TokenId,
    ) -> Result<(), CreditError> {
        if !line.is_owned_by(caller) {
            warn!(token_id = %token_id, caller = %caller, "Caller does not own credit line");
            return Err(CreditError::NotOwner {
                caller: caller.clone(),
                token_id,
            });
        }
        Ok(())
    }

    fn ensure_authorized(&self, caller: &AccountId) -> Result<(), CreditError> {
        if !self.auth.is_authorized(caller) {
            warn!(caller = %caller, "Unauthorized administrative call");
            return Err(CreditError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn record_rollover(&self, token_id: TokenId, rollover: &Rollover) {
        info!(
            token_id = %token_id,
            interest = %rollover.interest,
            score_penalty = rollover.score_penalty,
            "Billing cycle rolled over"
        );
        self.publish(CreditEvent::CycleRolledOver {
            token_id,
            interest: rollover.interest,
            score_penalty: rollover.score_penalty,
            used_credit: rollover.used_credit,
            credit_score: rollover.credit_score,
            reset_at: rollover.reset_at,
        });
    }

    fn publish(&self, event: CreditEvent) {
        let record = EventRecord::new(self.clock.now_millis(), event);
        // Err only means nobody is listening.
        let _ = self.events.send(record);
    }
}
