//! Point-in-time export of ledger accounting state.
//!
//! A snapshot is everything the ledger needs to resume: pool state and every
//! account record. Collaborators (assets, access control, clock) and event
//! subscribers are supplied again on restore.

use crate::error::LedgerError;
use crate::state::{AccountState, PoolState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trickle_types::{AccountId, AssetId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub custodian: AccountId,
    pub stake_asset: AssetId,
    pub reward_asset: AssetId,
    pub pool: PoolState,
    /// Sorted so identical states encode to identical bytes.
    pub accounts: BTreeMap<AccountId, AccountState>,
}

impl LedgerSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Check the snapshot is internally consistent.
    ///
    /// Deposits must sum to the pool total and no account checkpoint may be
    /// ahead of the global accumulator.
    pub fn verify(&self) -> Result<(), LedgerError> {
        if self.custodian.is_zero() {
            return Err(LedgerError::Snapshot("zero custodian".into()));
        }
        if self.pool.emission_rate == 0 {
            return Err(LedgerError::Snapshot("zero emission rate".into()));
        }
        if self.stake_asset == self.reward_asset {
            return Err(LedgerError::Snapshot(format!(
                "stake and reward asset are both {}",
                self.stake_asset
            )));
        }

        let mut deposited: u128 = 0;
        for (id, account) in &self.accounts {
            if id.is_zero() {
                return Err(LedgerError::Snapshot("record for zero account".into()));
            }
            if account.checkpoint > self.pool.accumulator {
                return Err(LedgerError::Snapshot(format!(
                    "account {id} checkpoint {} is ahead of accumulator {}",
                    account.checkpoint, self.pool.accumulator
                )));
            }
            deposited = deposited
                .checked_add(account.deposited)
                .ok_or_else(|| LedgerError::Snapshot("deposits overflow".into()))?;
        }
        if deposited != self.pool.total_deposited {
            return Err(LedgerError::Snapshot(format!(
                "deposits sum to {deposited}, pool total is {}",
                self.pool.total_deposited
            )));
        }
        Ok(())
    }
}
