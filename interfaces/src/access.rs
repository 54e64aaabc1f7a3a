use thiserror::Error;
use trickle_types::AccountId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("account {0} is not an administrator")]
    NotAdministrator(AccountId),
}

/// Gate for administrative operations.
pub trait AccessControl {
    /// Recipient of administrative payouts (emergency drain, asset recovery).
    fn owner(&self) -> AccountId;

    /// Fail unless `caller` holds administrative privilege.
    fn require_administrator(&self, caller: &AccountId) -> Result<(), AccessError>;
}
