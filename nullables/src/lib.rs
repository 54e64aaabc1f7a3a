//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the accrual ledger (clock, asset
//! transfer, access control) is abstracted behind a trait in
//! `trickle-interfaces`. This crate provides test-friendly implementations
//! that:
//! - Return deterministic values
//! - Can be controlled programmatically (advance time, inject failures)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod access;
pub mod asset;
pub mod clock;

pub use access::NullAccessControl;
pub use asset::NullAsset;
pub use clock::NullClock;
