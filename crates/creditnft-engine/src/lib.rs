//! # CreditNFT Engine
//!
//! Collateralised credit lines: stake USDC, mint a credit instrument, draw
//! against its limit, repay to rebuild the score.
//!
//! ## State machine
//!
//! ```text
//!            stake_and_mint
//!   (none) ─────────────────▶ Open(limit, used=0, score=700)
//!                                │        ▲
//!                   draw_credit  │        │ repay_credit
//!                                ▼        │
//!                         used ≤ limit ───┘
//!
//!   every draw / available-credit query first checks the billing cycle:
//!   now ≥ last_reset + 30d  ⇒  used += used × rate%, score -= penalty
//! ```
//!
//! ## Capabilities
//!
//! The engine owns no funds and no clock. It is wired with:
//! - [`PaymentGateway`]: moves USDC between owners and escrow
//! - [`AuthorizationCheck`]: gates the administrative setters
//! - [`Clock`]: supplies Unix-millisecond timestamps
//!
//! [`InMemoryEscrow`], [`OwnerAuthorization`] and [`ManualClock`] are the
//! in-process realisations used by the simulator and tests.

pub mod advisor;
pub mod auth;
pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod gateway;
pub mod payments;

pub use advisor::{CreditAdvisor, CreditSummary};
pub use auth::{AuthorizationCheck, OwnerAuthorization};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{CreditLineEngine, EngineSnapshot, LineEntry};
pub use events::{CreditEvent, EventRecord};
pub use gateway::{InMemoryEscrow, PaymentGateway};
pub use payments::{CardPayments, PaymentReceipt};

/// Default capacity of the lifecycle event channel
pub const DEFAULT_EVENT_BUFFER: usize = 1024;
