use thiserror::Error;
use trickle_types::{AccountId, AssetId};

/// Failure reported by an asset collaborator. A failed transfer moves nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds: need {needed}, available {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, allowance {allowance}")]
    InsufficientAllowance { needed: u128, allowance: u128 },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Atomic balance-transfer primitive for one fungible asset.
///
/// `custodian` is the account under which the ledger holds its funds in
/// this asset. Implementations must be all-or-nothing: when an `Err` is
/// returned, no balance or allowance has changed.
pub trait AssetLedger {
    /// Identifier of the asset this collaborator moves.
    fn asset_id(&self) -> &AssetId;

    fn balance_of(&self, holder: &AccountId) -> u128;

    /// Amount `owner` has authorized `spender` to pull.
    fn allowance_of(&self, owner: &AccountId, spender: &AccountId) -> u128;

    /// Pull `amount` from `from` into `custodian`, consuming the allowance
    /// `from` granted to `custodian`.
    fn transfer_in(
        &mut self,
        from: &AccountId,
        custodian: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Push `amount` from `custodian` to `to`.
    fn transfer_out(
        &mut self,
        custodian: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;
}
