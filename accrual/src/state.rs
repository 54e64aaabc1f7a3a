//! Global pool state and per-account accrual state.
//!
//! The pool owns one global accumulator (reward per unit of stake, scaled
//! by `SCALE`). Each account remembers the accumulator value it last saw;
//! the difference times its deposit is what it earned since. Nothing here
//! ever iterates over accounts.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use trickle_types::{Accumulator, Timestamp};

/// Global emission state shared by every account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Reward units emitted per second across all stakers.
    pub emission_rate: u128,
    /// Sum of every account's deposited balance.
    pub total_deposited: u128,
    /// Reward per unit of stake accumulated up to `last_sync`.
    pub accumulator: Accumulator,
    /// When `accumulator` was last brought up to date.
    pub last_sync: Timestamp,
}

impl PoolState {
    pub fn new(emission_rate: u128, genesis: Timestamp) -> Self {
        Self {
            emission_rate,
            total_deposited: 0,
            accumulator: Accumulator::ZERO,
            last_sync: genesis,
        }
    }

    /// The accumulator value a sync at `now` would store, without mutating.
    ///
    /// `accumulator + elapsed * rate * SCALE / total_deposited`, or unchanged
    /// when nothing is deposited or no time has passed. A `now` earlier than
    /// `last_sync` counts as zero elapsed time.
    pub fn projected_accumulator(&self, now: Timestamp) -> Result<Accumulator, LedgerError> {
        let elapsed = self.last_sync.elapsed_since(now);
        if self.total_deposited == 0 || elapsed == 0 {
            return Ok(self.accumulator);
        }
        let growth = Accumulator::growth(elapsed, self.emission_rate, self.total_deposited)
            .ok_or(LedgerError::Overflow)?;
        self.accumulator
            .checked_advance(growth)
            .ok_or(LedgerError::Overflow)
    }

    /// Bring the accumulator up to `now` and return the new value.
    ///
    /// `last_sync` never moves backwards.
    pub fn sync(&mut self, now: Timestamp) -> Result<Accumulator, LedgerError> {
        let accumulator = self.projected_accumulator(now)?;
        self.accumulator = accumulator;
        self.last_sync = self.last_sync.max(now);
        Ok(accumulator)
    }
}

/// Accrual state for a single account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Stake currently deposited.
    pub deposited: u128,
    /// Global accumulator value last folded into `settled_reward`.
    pub checkpoint: Accumulator,
    /// Reward earned and settled but not yet claimed.
    pub settled_reward: u128,
}

impl AccountState {
    /// A fresh account that starts earning from `checkpoint`.
    pub fn new(checkpoint: Accumulator) -> Self {
        Self {
            deposited: 0,
            checkpoint,
            settled_reward: 0,
        }
    }

    /// Reward earned since the checkpoint that has not been settled yet.
    pub fn unsettled(&self, accumulator: Accumulator) -> Result<u128, LedgerError> {
        accumulator
            .accrued_since(self.checkpoint, self.deposited)
            .ok_or(LedgerError::Overflow)
    }

    /// Total claimable reward as of `accumulator`: unsettled plus settled.
    pub fn entitlement(&self, accumulator: Accumulator) -> Result<u128, LedgerError> {
        self.unsettled(accumulator)?
            .checked_add(self.settled_reward)
            .ok_or(LedgerError::Overflow)
    }

    /// Fold unsettled reward into `settled_reward` and advance the checkpoint.
    ///
    /// Returns the amount newly settled.
    pub fn settle(&mut self, accumulator: Accumulator) -> Result<u128, LedgerError> {
        let earned = self.unsettled(accumulator)?;
        self.settled_reward = self
            .settled_reward
            .checked_add(earned)
            .ok_or(LedgerError::Overflow)?;
        self.checkpoint = accumulator;
        Ok(earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trickle_types::{SCALE, U256};

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    // --- PoolState ---

    #[test]
    fn accumulator_frozen_without_deposits() {
        let mut pool = PoolState::new(100, ts(0));
        assert_eq!(pool.sync(ts(1_000)).unwrap(), Accumulator::ZERO);
        assert_eq!(pool.last_sync, ts(1_000));
    }

    #[test]
    fn accumulator_grows_by_rate_over_total() {
        let mut pool = PoolState::new(100, ts(0));
        pool.total_deposited = 1_000;
        // 10s * 100/s = 1000 reward over 1000 stake = 1.0 per unit
        assert_eq!(pool.sync(ts(10)).unwrap(), Accumulator::from_raw(SCALE));
    }

    #[test]
    fn same_timestamp_sync_is_noop() {
        let mut pool = PoolState::new(100, ts(5));
        pool.total_deposited = 10;
        let before = pool.clone();
        pool.sync(ts(5)).unwrap();
        assert_eq!(pool, before);
    }

    #[test]
    fn clock_regression_does_not_rewind_last_sync() {
        let mut pool = PoolState::new(100, ts(50));
        pool.total_deposited = 10;
        let acc = pool.sync(ts(20)).unwrap();
        assert_eq!(acc, Accumulator::ZERO);
        assert_eq!(pool.last_sync, ts(50));
    }

    #[test]
    fn projection_matches_sync_and_does_not_mutate() {
        let mut pool = PoolState::new(7, ts(0));
        pool.total_deposited = 3;
        let projected = pool.projected_accumulator(ts(11)).unwrap();
        assert_eq!(pool.accumulator, Accumulator::ZERO);
        assert_eq!(pool.sync(ts(11)).unwrap(), projected);
    }

    #[test]
    fn dust_stake_at_full_rate_keeps_syncing() {
        let mut pool = PoolState::new(u128::MAX, ts(0));
        pool.total_deposited = 1;
        let first = pool.sync(ts(3_600)).unwrap();
        let second = pool.sync(ts(365 * 24 * 3_600)).unwrap();
        assert!(second > first);
        assert!(first.raw() > U256::from(u128::MAX));
    }

    #[test]
    fn accumulator_at_256_bit_limit_is_reported() {
        let mut pool = PoolState::new(1, ts(0));
        pool.total_deposited = 1;
        pool.accumulator = Accumulator::from_raw(U256::MAX);
        assert!(matches!(
            pool.projected_accumulator(ts(1)),
            Err(LedgerError::Overflow)
        ));
    }

    // --- AccountState ---

    #[test]
    fn settle_folds_reward_and_advances_checkpoint() {
        let mut account = AccountState::new(Accumulator::ZERO);
        account.deposited = 500;
        let acc = Accumulator::from_raw(2 * SCALE);
        assert_eq!(account.entitlement(acc).unwrap(), 1_000);
        assert_eq!(account.settle(acc).unwrap(), 1_000);
        assert_eq!(account.settled_reward, 1_000);
        assert_eq!(account.checkpoint, acc);
        // Settling again at the same accumulator earns nothing new.
        assert_eq!(account.settle(acc).unwrap(), 0);
        assert_eq!(account.entitlement(acc).unwrap(), 1_000);
    }

    #[test]
    fn new_account_starts_at_current_accumulator() {
        let acc = Accumulator::from_raw(42 * SCALE);
        let account = AccountState::new(acc);
        assert_eq!(account.entitlement(acc).unwrap(), 0);
    }

    #[test]
    fn zero_balance_accrues_nothing() {
        let account = AccountState::new(Accumulator::ZERO);
        assert_eq!(account.unsettled(Accumulator::from_raw(U256::MAX)).unwrap(), 0);
    }

    #[test]
    fn reward_too_large_for_u128_is_reported() {
        let mut account = AccountState::new(Accumulator::ZERO);
        account.deposited = u128::MAX;
        assert!(matches!(
            account.unsettled(Accumulator::from_raw(U256::MAX)),
            Err(LedgerError::Overflow)
        ));
    }
}
