//! Nullable asset: in-memory fungible balances with failure injection.

use std::collections::HashMap;
use trickle_interfaces::{AssetLedger, TransferError};
use trickle_types::{AccountId, AssetId};

/// An in-memory fungible asset for testing.
///
/// Balances and allowances live in hash maps. Transfers can be forced to
/// fail, either persistently (`set_failing`) or once (`fail_next_transfer`),
/// to exercise rollback paths.
#[derive(Clone, Debug)]
pub struct NullAsset {
    id: AssetId,
    balances: HashMap<AccountId, u128>,
    allowances: HashMap<(AccountId, AccountId), u128>,
    failing: bool,
    fail_next: bool,
    transfers: u64,
}

impl NullAsset {
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            failing: false,
            fail_next: false,
            transfers: 0,
        }
    }

    /// Create `amount` out of thin air for `holder`.
    pub fn mint(&mut self, holder: &AccountId, amount: u128) {
        let balance = self.balances.entry(*holder).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Set the allowance `owner` grants `spender` (replaces any previous value).
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
    }

    /// Reject every transfer while `failing` is set.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Reject only the next transfer attempt.
    pub fn fail_next_transfer(&mut self) {
        self.fail_next = true;
    }

    /// Number of transfers that completed successfully.
    pub fn transfer_count(&self) -> u64 {
        self.transfers
    }

    /// Sum of all balances, saturating at `u128::MAX`.
    pub fn total_supply(&self) -> u128 {
        self.balances
            .values()
            .fold(0u128, |total, balance| total.saturating_add(*balance))
    }

    fn check_injected_failure(&mut self) -> Result<(), TransferError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TransferError::Rejected("injected one-shot failure".into()));
        }
        if self.failing {
            return Err(TransferError::Rejected("transfers disabled".into()));
        }
        Ok(())
    }

    /// Move `amount` between holders after every check has passed.
    fn settle_move(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        if from != to {
            let credited = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or_else(|| TransferError::Rejected("recipient balance overflow".into()))?;
            self.balances.insert(*from, available - amount);
            self.balances.insert(*to, credited);
        }
        self.transfers += 1;
        Ok(())
    }
}

impl AssetLedger for NullAsset {
    fn asset_id(&self) -> &AssetId {
        &self.id
    }

    fn balance_of(&self, holder: &AccountId) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn allowance_of(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn transfer_in(
        &mut self,
        from: &AccountId,
        custodian: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        self.check_injected_failure()?;
        let allowance = self.allowance_of(from, custodian);
        if allowance < amount {
            return Err(TransferError::InsufficientAllowance {
                needed: amount,
                allowance,
            });
        }
        self.settle_move(from, custodian, amount)?;
        self.allowances
            .insert((*from, *custodian), allowance - amount);
        Ok(())
    }

    fn transfer_out(
        &mut self,
        custodian: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        self.check_injected_failure()?;
        self.settle_move(custodian, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    fn asset() -> NullAsset {
        NullAsset::new(AssetId::new("STAKE").unwrap())
    }

    #[test]
    fn transfer_in_consumes_allowance() {
        let mut a = asset();
        a.mint(&account(1), 100);
        a.approve(&account(1), &account(9), 60);

        a.transfer_in(&account(1), &account(9), 40).unwrap();
        assert_eq!(a.balance_of(&account(1)), 60);
        assert_eq!(a.balance_of(&account(9)), 40);
        assert_eq!(a.allowance_of(&account(1), &account(9)), 20);
        assert_eq!(a.transfer_count(), 1);
    }

    #[test]
    fn transfer_in_without_allowance_moves_nothing() {
        let mut a = asset();
        a.mint(&account(1), 100);
        let err = a.transfer_in(&account(1), &account(9), 10).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientAllowance {
                needed: 10,
                allowance: 0
            }
        );
        assert_eq!(a.balance_of(&account(1)), 100);
    }

    #[test]
    fn transfer_out_insufficient_funds() {
        let mut a = asset();
        a.mint(&account(9), 5);
        let err = a.transfer_out(&account(9), &account(1), 6).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
        assert_eq!(a.total_supply(), 5);
    }

    #[test]
    fn total_supply_saturates_across_holders() {
        let mut a = asset();
        a.mint(&account(1), u128::MAX / 2 + 1);
        a.mint(&account(2), u128::MAX / 2 + 1);
        assert_eq!(a.total_supply(), u128::MAX);
    }

    #[test]
    fn one_shot_failure_only_hits_next_transfer() {
        let mut a = asset();
        a.mint(&account(9), 50);
        a.fail_next_transfer();
        assert!(a.transfer_out(&account(9), &account(1), 10).is_err());
        assert!(a.transfer_out(&account(9), &account(1), 10).is_ok());
        assert_eq!(a.balance_of(&account(1)), 10);
    }

    #[test]
    fn persistent_failure_until_cleared() {
        let mut a = asset();
        a.mint(&account(9), 50);
        a.set_failing(true);
        assert!(a.transfer_out(&account(9), &account(1), 1).is_err());
        assert!(a.transfer_out(&account(9), &account(1), 1).is_err());
        a.set_failing(false);
        assert!(a.transfer_out(&account(9), &account(1), 1).is_ok());
    }
}
