//! Accrual-ledger errors.
//!
//! Every variant is raised before any state is committed; an operation
//! that returns an error has left the ledger exactly as it found it.

use thiserror::Error;
use trickle_interfaces::{AccessError, TransferError};
use trickle_types::{AssetId, TypesError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("transfer not authorized: need {needed}, allowance {allowance}")]
    InsufficientAuthorization { needed: u128, allowance: u128 },

    #[error("transfer failed: {0}")]
    TransferFailed(TransferError),

    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AccessError),

    #[error("asset {0} is protected and cannot be recovered")]
    ProtectedAsset(AssetId),

    #[error("arithmetic overflow in accrual computation")]
    Overflow,

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<TransferError> for LedgerError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientAllowance { needed, allowance } => {
                LedgerError::InsufficientAuthorization { needed, allowance }
            }
            other => LedgerError::TransferFailed(other),
        }
    }
}

impl From<TypesError> for LedgerError {
    fn from(err: TypesError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}
