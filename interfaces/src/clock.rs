use trickle_types::Timestamp;

/// Source of the current time in whole seconds.
///
/// A reading earlier than a previous one is tolerated; the ledger treats it
/// as no time having passed.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in whole Unix seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
