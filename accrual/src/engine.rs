//! Core accrual engine.

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::event::{EventBus, LedgerEvent};
use crate::snapshot::LedgerSnapshot;
use crate::state::{AccountState, PoolState};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use trickle_interfaces::{AccessControl, AssetLedger, Clock};
use trickle_types::{AccountId, Accumulator, Timestamp};
use trickle_utils::spans;

/// State captured before an operation so a failure can put it back.
struct Undo {
    pool: PoolState,
    account: Option<(AccountId, Option<AccountState>)>,
}

/// Index-based reward accrual ledger.
///
/// Reward is tracked with a single global accumulator (reward per unit of
/// stake) so no operation ever iterates over accounts. Every mutating
/// operation runs through [`AccrualLedger::transact`], which syncs the
/// accumulator, settles the initiating account, applies the effect, and
/// restores the previous state if anything fails.
///
/// Internal debits always precede outbound transfers, and no fallible
/// internal step runs after a transfer has succeeded.
pub struct AccrualLedger<S, R, A, C> {
    custodian: AccountId,
    pool: PoolState,
    accounts: HashMap<AccountId, AccountState>,
    stake: S,
    reward: R,
    access: A,
    clock: C,
    events: EventBus,
}

fn require_account(id: &AccountId) -> Result<(), LedgerError> {
    if id.is_zero() {
        return Err(LedgerError::InvalidArgument("zero account id".into()));
    }
    Ok(())
}

fn require_amount(amount: u128) -> Result<(), LedgerError> {
    if amount == 0 {
        return Err(LedgerError::InvalidArgument("amount must be positive".into()));
    }
    Ok(())
}

impl<S, R, A, C> AccrualLedger<S, R, A, C>
where
    S: AssetLedger,
    R: AssetLedger,
    A: AccessControl,
    C: Clock,
{
    /// Create a ledger holding its funds under `custodian`, emitting
    /// `emission_rate` reward units per second from `clock.now()` onwards.
    pub fn new(
        custodian: AccountId,
        emission_rate: u128,
        stake: S,
        reward: R,
        access: A,
        clock: C,
    ) -> Result<Self, LedgerError> {
        require_account(&custodian)?;
        if emission_rate == 0 {
            return Err(LedgerError::InvalidArgument(
                "emission rate must be positive".into(),
            ));
        }
        if stake.asset_id() == reward.asset_id() {
            return Err(LedgerError::InvalidArgument(format!(
                "stake and reward asset must differ, both are {}",
                stake.asset_id()
            )));
        }
        let genesis = clock.now();
        info!(
            %custodian,
            emission_rate,
            stake_asset = %stake.asset_id(),
            reward_asset = %reward.asset_id(),
            %genesis,
            "accrual ledger created"
        );
        Ok(Self {
            custodian,
            pool: PoolState::new(emission_rate, genesis),
            accounts: HashMap::new(),
            stake,
            reward,
            access,
            clock,
            events: EventBus::new(),
        })
    }

    /// Create a ledger from a validated config, checking that the supplied
    /// asset collaborators are the ones the config names.
    pub fn from_config(
        config: &LedgerConfig,
        stake: S,
        reward: R,
        access: A,
        clock: C,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let (stake_id, reward_id) = (config.stake_asset_id()?, config.reward_asset_id()?);
        if stake.asset_id() != &stake_id || reward.asset_id() != &reward_id {
            return Err(LedgerError::Config(format!(
                "config expects assets {stake_id}/{reward_id}, got {}/{}",
                stake.asset_id(),
                reward.asset_id()
            )));
        }
        Self::new(
            config.custodian,
            u128::from(config.emission_rate),
            stake,
            reward,
            access,
            clock,
        )
    }

    // ── Transaction plumbing ───────────────────────────────────────────

    /// Run one all-or-nothing operation.
    ///
    /// Order is fixed: sync the global accumulator, settle `account` (if
    /// any; created on first touch), then apply `effect`. On error the pool
    /// and the touched account are restored exactly.
    fn transact<T>(
        &mut self,
        account: Option<&AccountId>,
        effect: impl FnOnce(&mut Self, Timestamp) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let undo = Undo {
            pool: self.pool.clone(),
            account: account.map(|id| (*id, self.accounts.get(id).cloned())),
        };
        let now = self.clock.now();
        let result = self
            .sync_and_settle(account, now)
            .and_then(|()| effect(self, now));
        if let Err(err) = &result {
            warn!(error = %err, "operation failed, state rolled back");
            self.rollback(undo);
        }
        result
    }

    fn sync_and_settle(
        &mut self,
        account: Option<&AccountId>,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if now < self.pool.last_sync {
            warn!(%now, last_sync = %self.pool.last_sync, "clock went backwards, no accrual");
        }
        let accumulator = self.pool.sync(now)?;
        debug!(
            %accumulator,
            total_deposited = self.pool.total_deposited,
            "global accumulator synced"
        );
        if let Some(id) = account {
            let state = self
                .accounts
                .entry(*id)
                .or_insert_with(|| AccountState::new(accumulator));
            let earned = state.settle(accumulator)?;
            debug!(account = %id, earned, settled = state.settled_reward, "account settled");
        }
        Ok(())
    }

    fn rollback(&mut self, undo: Undo) {
        self.pool = undo.pool;
        if let Some((id, previous)) = undo.account {
            match previous {
                Some(state) => {
                    self.accounts.insert(id, state);
                }
                None => {
                    self.accounts.remove(&id);
                }
            }
        }
    }

    fn settled_account(&mut self, id: &AccountId) -> Result<&mut AccountState, LedgerError> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::InvalidArgument(format!("account {id} was not settled")))
    }

    fn require_participant(&self, caller: &AccountId) -> Result<(), LedgerError> {
        require_account(caller)?;
        if *caller == self.custodian {
            return Err(LedgerError::InvalidArgument(
                "the custodian cannot act as a participant".into(),
            ));
        }
        Ok(())
    }

    // ── Participant operations ─────────────────────────────────────────

    /// Deposit `amount` of the stake asset from `caller`.
    ///
    /// The caller must have authorized the custodian to pull `amount`.
    pub fn deposit(&mut self, caller: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let _span = spans::account_op_span("deposit", caller, amount).entered();
        self.require_participant(caller)?;
        require_amount(amount)?;

        let event = self.transact(Some(caller), |ledger, now| {
            let custodian = ledger.custodian;
            let allowance = ledger.stake.allowance_of(caller, &custodian);
            if allowance < amount {
                return Err(LedgerError::InsufficientAuthorization {
                    needed: amount,
                    allowance,
                });
            }
            let total = ledger
                .pool
                .total_deposited
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            let balance = ledger
                .settled_account(caller)?
                .deposited
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;

            ledger.stake.transfer_in(caller, &custodian, amount)?;

            ledger.pool.total_deposited = total;
            ledger.settled_account(caller)?.deposited = balance;
            Ok(LedgerEvent::Deposited {
                account: *caller,
                amount,
                at: now,
            })
        })?;
        self.events.emit(&event);
        Ok(())
    }

    /// Withdraw `amount` of deposited stake back to `caller`.
    pub fn withdraw(&mut self, caller: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let _span = spans::account_op_span("withdraw", caller, amount).entered();
        self.require_participant(caller)?;
        require_amount(amount)?;

        let event = self.transact(Some(caller), |ledger, now| {
            let custodian = ledger.custodian;
            let account = ledger.settled_account(caller)?;
            if account.deposited < amount {
                return Err(LedgerError::InsufficientBalance {
                    needed: amount,
                    available: account.deposited,
                });
            }
            account.deposited -= amount;
            ledger.pool.total_deposited = ledger
                .pool
                .total_deposited
                .checked_sub(amount)
                .ok_or(LedgerError::Overflow)?;

            ledger.stake.transfer_out(&custodian, caller, amount)?;

            Ok(LedgerEvent::Withdrawn {
                account: *caller,
                amount,
                at: now,
            })
        })?;
        self.events.emit(&event);
        Ok(())
    }

    /// Pay `caller` all of its settled reward. Returns the amount paid.
    pub fn claim_rewards(&mut self, caller: &AccountId) -> Result<u128, LedgerError> {
        let _span = spans::account_op_span("claim", caller, 0).entered();
        self.require_participant(caller)?;

        let (owed, event) = self.transact(Some(caller), |ledger, now| {
            let custodian = ledger.custodian;
            let owed = ledger.settled_account(caller)?.settled_reward;
            if owed == 0 {
                return Err(LedgerError::InvalidArgument("no reward to claim".into()));
            }
            let reserve = ledger.reward.balance_of(&custodian);
            if reserve < owed {
                return Err(LedgerError::InsufficientBalance {
                    needed: owed,
                    available: reserve,
                });
            }
            ledger.settled_account(caller)?.settled_reward = 0;

            ledger.reward.transfer_out(&custodian, caller, owed)?;

            Ok((
                owed,
                LedgerEvent::Claimed {
                    account: *caller,
                    amount: owed,
                    at: now,
                },
            ))
        })?;
        self.events.emit(&event);
        Ok(owed)
    }

    /// Top up the reward reserve with `amount` of the reward asset.
    ///
    /// Accrual is unaffected; the reserve only bounds what claims can pay.
    pub fn fund_rewards(&mut self, funder: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let _span = spans::account_op_span("fund", funder, amount).entered();
        self.require_participant(funder)?;
        require_amount(amount)?;

        let event = self.transact(None, |ledger, now| {
            let custodian = ledger.custodian;
            let allowance = ledger.reward.allowance_of(funder, &custodian);
            if allowance < amount {
                return Err(LedgerError::InsufficientAuthorization {
                    needed: amount,
                    allowance,
                });
            }
            ledger.reward.transfer_in(funder, &custodian, amount)?;
            Ok(LedgerEvent::RewardsFunded {
                funder: *funder,
                amount,
                at: now,
            })
        })?;
        self.events.emit(&event);
        Ok(())
    }

    // ── Administrative operations ──────────────────────────────────────

    /// Change the emission rate. Accrual up to now uses the old rate.
    pub fn set_emission_rate(&mut self, caller: &AccountId, new_rate: u128) -> Result<(), LedgerError> {
        let _span = spans::admin_op_span("set_emission_rate", caller).entered();
        self.access.require_administrator(caller)?;
        if new_rate == 0 {
            return Err(LedgerError::InvalidArgument(
                "emission rate must be positive".into(),
            ));
        }

        let event = self.transact(None, |ledger, now| {
            let old_rate = ledger.pool.emission_rate;
            ledger.pool.emission_rate = new_rate;
            Ok(LedgerEvent::RateChanged {
                caller: *caller,
                old_rate,
                new_rate,
                at: now,
            })
        })?;
        self.events.emit(&event);
        Ok(())
    }

    /// Send the entire reward reserve to the owner. Returns the amount drained.
    pub fn emergency_drain(&mut self, caller: &AccountId) -> Result<u128, LedgerError> {
        let _span = spans::admin_op_span("emergency_drain", caller).entered();
        self.access.require_administrator(caller)?;
        let owner = self.access.owner();
        require_account(&owner)?;

        let (drained, event) = self.transact(None, |ledger, now| {
            let custodian = ledger.custodian;
            let reserve = ledger.reward.balance_of(&custodian);
            if reserve == 0 {
                return Err(LedgerError::InvalidArgument("reward reserve is empty".into()));
            }
            ledger.reward.transfer_out(&custodian, &owner, reserve)?;
            Ok((
                reserve,
                LedgerEvent::EmergencyDrained {
                    caller: *caller,
                    to: owner,
                    amount: reserve,
                    at: now,
                },
            ))
        })?;
        self.events.emit(&event);
        Ok(drained)
    }

    /// Return `amount` of an asset that is neither the stake nor the reward
    /// asset from the custodian to the owner.
    pub fn recover_foreign_asset<F>(
        &mut self,
        caller: &AccountId,
        asset: &mut F,
        amount: u128,
    ) -> Result<(), LedgerError>
    where
        F: AssetLedger + ?Sized,
    {
        let _span = spans::admin_op_span("recover_foreign_asset", caller).entered();
        self.access.require_administrator(caller)?;
        require_amount(amount)?;
        let asset_id = asset.asset_id().clone();
        if &asset_id == self.stake.asset_id() || &asset_id == self.reward.asset_id() {
            return Err(LedgerError::ProtectedAsset(asset_id));
        }
        let owner = self.access.owner();
        require_account(&owner)?;

        let event = self.transact(None, |ledger, now| {
            let custodian = ledger.custodian;
            let held = asset.balance_of(&custodian);
            if held < amount {
                return Err(LedgerError::InsufficientBalance {
                    needed: amount,
                    available: held,
                });
            }
            asset.transfer_out(&custodian, &owner, amount)?;
            Ok(LedgerEvent::ForeignAssetRecovered {
                caller: *caller,
                asset: asset_id,
                to: owner,
                amount,
                at: now,
            })
        })?;
        self.events.emit(&event);
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Reward `account` could claim right now, computed without mutating.
    pub fn pending_reward_of(&self, account: &AccountId) -> Result<u128, LedgerError> {
        let accumulator = self.reward_per_token()?;
        match self.accounts.get(account) {
            Some(state) => state.entitlement(accumulator),
            None => Ok(0),
        }
    }

    /// The accumulator value a sync right now would produce.
    pub fn reward_per_token(&self) -> Result<Accumulator, LedgerError> {
        self.pool.projected_accumulator(self.clock.now())
    }

    pub fn staked_balance_of(&self, account: &AccountId) -> u128 {
        self.accounts.get(account).map(|s| s.deposited).unwrap_or(0)
    }

    pub fn total_staked(&self) -> u128 {
        self.pool.total_deposited
    }

    pub fn current_rate(&self) -> u128 {
        self.pool.emission_rate
    }

    /// Reward asset currently held by the custodian.
    pub fn reward_reserve(&self) -> u128 {
        self.reward.balance_of(&self.custodian)
    }

    pub fn last_sync_time(&self) -> Timestamp {
        self.pool.last_sync
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn account(&self, id: &AccountId) -> Option<&AccountState> {
        self.accounts.get(id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &AccountState)> {
        self.accounts.iter()
    }

    pub fn custodian(&self) -> AccountId {
        self.custodian
    }

    // ── Collaborators and events ───────────────────────────────────────

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn stake_asset(&self) -> &S {
        &self.stake
    }

    /// Direct access to the stake collaborator. Moving custodian funds
    /// through it bypasses the ledger's bookkeeping.
    pub fn stake_asset_mut(&mut self) -> &mut S {
        &mut self.stake
    }

    pub fn reward_asset(&self) -> &R {
        &self.reward
    }

    pub fn reward_asset_mut(&mut self) -> &mut R {
        &mut self.reward
    }

    pub fn access_control(&self) -> &A {
        &self.access
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<S, R, A, C> AccrualLedger<S, R, A, C>
where
    S: AssetLedger,
    R: AssetLedger,
    A: AccessControl,
    C: Clock,
{
    /// Export the full accounting state for an external store.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            custodian: self.custodian,
            stake_asset: self.stake.asset_id().clone(),
            reward_asset: self.reward.asset_id().clone(),
            pool: self.pool.clone(),
            accounts: self
                .accounts
                .iter()
                .map(|(id, state)| (*id, state.clone()))
                .collect(),
        }
    }

    /// Rebuild a ledger from a snapshot and live collaborators.
    ///
    /// The snapshot must be internally consistent and name the same assets
    /// as the collaborators. Event subscribers are not part of a snapshot.
    pub fn restore(
        snapshot: LedgerSnapshot,
        stake: S,
        reward: R,
        access: A,
        clock: C,
    ) -> Result<Self, LedgerError> {
        snapshot.verify()?;
        if stake.asset_id() != &snapshot.stake_asset || reward.asset_id() != &snapshot.reward_asset {
            return Err(LedgerError::Snapshot(format!(
                "snapshot holds assets {}/{}, collaborators are {}/{}",
                snapshot.stake_asset,
                snapshot.reward_asset,
                stake.asset_id(),
                reward.asset_id()
            )));
        }
        info!(
            accounts = snapshot.accounts.len(),
            total_deposited = snapshot.pool.total_deposited,
            "accrual ledger restored from snapshot"
        );
        Ok(Self {
            custodian: snapshot.custodian,
            pool: snapshot.pool,
            accounts: snapshot.accounts.into_iter().collect(),
            stake,
            reward,
            access,
            clock,
            events: EventBus::new(),
        })
    }
}
