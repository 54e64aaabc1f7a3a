//! Trickle accrual ledger: stake in, reward out, proportionally over time.
//!
//! A fixed emission rate is shared across all depositors in proportion to
//! their stake. Each account's entitlement is
//! `deposited × (accumulator − checkpoint) / SCALE` plus whatever was already
//! settled, so every operation is O(1) regardless of the number of accounts.
//!
//! This crate handles:
//! - Deposits, withdrawals and reward claims against external asset ledgers
//! - Emission-rate changes that never rewrite past accrual
//! - Administrative drain and recovery of mistakenly sent assets
//! - Events, TOML configuration and bincode snapshots

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod handle;
pub mod snapshot;
pub mod state;

pub use config::LedgerConfig;
pub use engine::AccrualLedger;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use handle::LedgerHandle;
pub use snapshot::LedgerSnapshot;
pub use state::{AccountState, PoolState};
