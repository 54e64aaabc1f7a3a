//! Fundamental types for the Trickle accrual ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, asset identifiers, timestamps, and the fixed-point
//! accumulator used for reward-per-unit-stake accounting.

pub mod account;
pub mod asset;
pub mod error;
pub mod fixed;
pub mod time;

pub use account::AccountId;
pub use asset::AssetId;
pub use error::TypesError;
pub use fixed::{mul_div, Accumulator, SCALE};
pub use time::Timestamp;

pub use primitive_types::U256;
