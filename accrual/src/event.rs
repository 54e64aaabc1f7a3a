//! Events emitted by committed ledger operations.

use serde::{Deserialize, Serialize};
use trickle_types::{AccountId, AssetId, Timestamp};

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
///
/// Events are only emitted after an operation has fully committed, so an
/// indexer replaying them reconstructs the exact ledger history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Stake was deposited.
    Deposited {
        account: AccountId,
        amount: u128,
        at: Timestamp,
    },
    /// Stake was withdrawn.
    Withdrawn {
        account: AccountId,
        amount: u128,
        at: Timestamp,
    },
    /// Settled reward was paid out.
    Claimed {
        account: AccountId,
        amount: u128,
        at: Timestamp,
    },
    /// The emission rate changed; accrual before `at` used `old_rate`.
    RateChanged {
        caller: AccountId,
        old_rate: u128,
        new_rate: u128,
        at: Timestamp,
    },
    /// The reward reserve was topped up.
    RewardsFunded {
        funder: AccountId,
        amount: u128,
        at: Timestamp,
    },
    /// The whole reward reserve was sent to the owner.
    EmergencyDrained {
        caller: AccountId,
        to: AccountId,
        amount: u128,
        at: Timestamp,
    },
    /// A stray asset was returned to the owner.
    ForeignAssetRecovered {
        caller: AccountId,
        asset: AssetId,
        to: AccountId,
        amount: u128,
        at: Timestamp,
    },
}

impl LedgerEvent {
    /// Short stable name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::Deposited { .. } => "deposited",
            LedgerEvent::Withdrawn { .. } => "withdrawn",
            LedgerEvent::Claimed { .. } => "claimed",
            LedgerEvent::RateChanged { .. } => "rate_changed",
            LedgerEvent::RewardsFunded { .. } => "rewards_funded",
            LedgerEvent::EmergencyDrained { .. } => "emergency_drained",
            LedgerEvent::ForeignAssetRecovered { .. } => "foreign_asset_recovered",
        }
    }

    /// JSON encoding for off-ledger indexers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline on the emitting thread while the ledger is
/// borrowed; keep handlers fast and never call back into the ledger.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        tracing::info!(event = event.kind(), ?event, "ledger event");
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
