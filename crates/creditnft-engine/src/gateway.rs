//! Payment gateway - USDC movement between owners and escrow
//!
//! The engine never touches balances itself. Every fund movement goes through
//! a [`PaymentGateway`], which must be atomic from the engine's point of view:
//! on `Ok` the funds moved, on `Err` nothing moved.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use creditnft_common::{AccountId, TransferError, Usdc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Capability to move USDC on behalf of the engine
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Collect `amount` from `owner` into escrow
    async fn transfer_in(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError>;

    /// Disburse `amount` from escrow to `owner`
    async fn transfer_out(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError>;

    /// Move `amount` directly from one wallet to another
    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Usdc,
    ) -> Result<(), TransferError>;

    /// Wallet balance of `owner`
    async fn balance_of(&self, owner: &AccountId) -> Result<Usdc, TransferError>;
}

/// In-process escrow ledger
///
/// Wallet balances live in a DashMap; the escrow pool (collateral, repayments
/// and lending liquidity) is a single mutex-guarded amount.
pub struct InMemoryEscrow {
    wallets: DashMap<AccountId, Usdc>,
    escrow: Mutex<Usdc>,
    offline: AtomicBool,
}

impl Default for InMemoryEscrow {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEscrow {
    pub fn new() -> Self {
        Self {
            wallets: DashMap::new(),
            escrow: Mutex::new(Usdc::ZERO),
            offline: AtomicBool::new(false),
        }
    }

    /// Escrow pre-funded with lending liquidity
    pub fn with_liquidity(liquidity: Usdc) -> Self {
        let escrow = Self::new();
        *escrow.escrow.lock() = liquidity;
        escrow
    }

    /// Mint wallet funds for `owner` (test and simulation faucet)
    pub fn fund(&self, owner: &AccountId, amount: Usdc) {
        let mut balance = self.wallets.entry(owner.clone()).or_default();
        let funded = Usdc::from_units(balance.units().saturating_add(amount.units()));
        *balance = funded;
    }

    /// Current wallet balance, zero for unknown accounts
    pub fn balance(&self, owner: &AccountId) -> Usdc {
        self.wallets.get(owner).map(|b| *b).unwrap_or_default()
    }

    pub fn escrow_balance(&self) -> Usdc {
        *self.escrow.lock()
    }

    /// Make every call fail with `Unavailable` until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), TransferError> {
        if self.offline.load(Ordering::SeqCst) {
            warn!("Escrow ledger offline, refusing transfer");
            return Err(TransferError::Unavailable("escrow ledger offline".to_string()));
        }
        Ok(())
    }

    fn debit_wallet(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError> {
        let Some(mut balance) = self.wallets.get_mut(owner) else {
            return Err(TransferError::InsufficientFunds {
                required: amount,
                balance: Usdc::ZERO,
            });
        };

        let current = *balance;
        let remaining = current
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientFunds {
                required: amount,
                balance: current,
            })?;
        *balance = remaining;
        Ok(())
    }

    fn credit_wallet(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError> {
        let mut balance = self.wallets.entry(owner.clone()).or_default();
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("wallet balance overflow".to_string()))?;
        *balance = updated;
        Ok(())
    }

    fn collect(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError> {
        let mut escrow = self.escrow.lock();
        let new_escrow = escrow
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("escrow overflow".to_string()))?;
        self.debit_wallet(owner, amount)?;
        *escrow = new_escrow;
        Ok(())
    }

    fn disburse(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError> {
        let mut escrow = self.escrow.lock();
        let current = *escrow;
        let new_escrow = current
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientEscrow {
                required: amount,
                escrow: current,
            })?;
        self.credit_wallet(owner, amount)?;
        *escrow = new_escrow;
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryEscrow {
    async fn transfer_in(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError> {
        self.ensure_online()?;
        self.collect(owner, amount)?;

        debug!(owner = %owner, amount = %amount, "Collected into escrow");
        Ok(())
    }

    async fn transfer_out(&self, owner: &AccountId, amount: Usdc) -> Result<(), TransferError> {
        self.ensure_online()?;
        self.disburse(owner, amount)?;

        debug!(owner = %owner, amount = %amount, "Disbursed from escrow");
        Ok(())
    }

    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Usdc,
    ) -> Result<(), TransferError> {
        self.ensure_online()?;

        if from == to {
            // Self-transfer: balance check only.
            let balance = self.balance(from);
            if balance < amount {
                return Err(TransferError::InsufficientFunds {
                    required: amount,
                    balance,
                });
            }
            return Ok(());
        }

        self.debit_wallet(from, amount)?;
        if let Err(err) = self.credit_wallet(to, amount) {
            // Refund the debit.
            let _ = self.credit_wallet(from, amount);
            return Err(err);
        }

        debug!(from = %from, to = %to, amount = %amount, "Wallet transfer");
        Ok(())
    }

    async fn balance_of(&self, owner: &AccountId) -> Result<Usdc, TransferError> {
        self.ensure_online()?;
        Ok(self.balance(owner))
    }
}
