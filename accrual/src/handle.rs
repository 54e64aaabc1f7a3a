//! Shared async handle to a single ledger.
//!
//! The ledger is single-writer. Tasks that need to reach it concurrently
//! share one `Arc<Mutex<_>>`, so operations are serialized and each one
//! still runs to completion before the next begins.

use crate::engine::AccrualLedger;
use crate::error::LedgerError;
use crate::snapshot::LedgerSnapshot;
use std::sync::Arc;
use tokio::sync::Mutex;
use trickle_interfaces::{AccessControl, AssetLedger, Clock};
use trickle_types::{AccountId, Accumulator, Timestamp};

pub struct LedgerHandle<S, R, A, C> {
    inner: Arc<Mutex<AccrualLedger<S, R, A, C>>>,
}

impl<S, R, A, C> Clone for LedgerHandle<S, R, A, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, R, A, C> LedgerHandle<S, R, A, C>
where
    S: AssetLedger,
    R: AssetLedger,
    A: AccessControl,
    C: Clock,
{
    pub fn new(ledger: AccrualLedger<S, R, A, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub async fn deposit(&self, caller: AccountId, amount: u128) -> Result<(), LedgerError> {
        self.inner.lock().await.deposit(&caller, amount)
    }

    pub async fn withdraw(&self, caller: AccountId, amount: u128) -> Result<(), LedgerError> {
        self.inner.lock().await.withdraw(&caller, amount)
    }

    pub async fn claim_rewards(&self, caller: AccountId) -> Result<u128, LedgerError> {
        self.inner.lock().await.claim_rewards(&caller)
    }

    pub async fn fund_rewards(&self, funder: AccountId, amount: u128) -> Result<(), LedgerError> {
        self.inner.lock().await.fund_rewards(&funder, amount)
    }

    pub async fn set_emission_rate(&self, caller: AccountId, new_rate: u128) -> Result<(), LedgerError> {
        self.inner.lock().await.set_emission_rate(&caller, new_rate)
    }

    pub async fn emergency_drain(&self, caller: AccountId) -> Result<u128, LedgerError> {
        self.inner.lock().await.emergency_drain(&caller)
    }

    pub async fn recover_foreign_asset<F>(
        &self,
        caller: AccountId,
        asset: &mut F,
        amount: u128,
    ) -> Result<(), LedgerError>
    where
        F: AssetLedger + ?Sized,
    {
        self.inner
            .lock()
            .await
            .recover_foreign_asset(&caller, asset, amount)
    }

    pub async fn pending_reward_of(&self, account: AccountId) -> Result<u128, LedgerError> {
        self.inner.lock().await.pending_reward_of(&account)
    }

    pub async fn reward_per_token(&self) -> Result<Accumulator, LedgerError> {
        self.inner.lock().await.reward_per_token()
    }

    pub async fn reward_reserve(&self) -> u128 {
        self.inner.lock().await.reward_reserve()
    }

    pub async fn last_sync_time(&self) -> Timestamp {
        self.inner.lock().await.last_sync_time()
    }

    pub async fn staked_balance_of(&self, account: AccountId) -> u128 {
        self.inner.lock().await.staked_balance_of(&account)
    }

    pub async fn total_staked(&self) -> u128 {
        self.inner.lock().await.total_staked()
    }

    pub async fn current_rate(&self) -> u128 {
        self.inner.lock().await.current_rate()
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Run `f` with exclusive access to the ledger, e.g. for compound reads
    /// or collaborator setup.
    pub async fn with<T>(&self, f: impl FnOnce(&mut AccrualLedger<S, R, A, C>) -> T) -> T {
        let mut ledger = self.inner.lock().await;
        f(&mut ledger)
    }
}
