//! Collaborator traits consumed by the accrual ledger.
//!
//! The ledger never moves funds, checks privileges, or reads the time by
//! itself. Real backends (token contracts, ACL services, the system clock)
//! and the in-memory nullables used in tests implement these traits. The
//! rest of the codebase depends only on the traits.

pub mod access;
pub mod asset;
pub mod clock;

pub use access::{AccessControl, AccessError};
pub use asset::{AssetLedger, TransferError};
pub use clock::{Clock, SystemClock};
