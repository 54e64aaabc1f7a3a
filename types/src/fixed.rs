//! Fixed-point reward-per-unit-stake accumulator.
//!
//! The accumulator is a ratio scaled by [`SCALE`] (10^18) and stored as a
//! 256-bit [`U256`]. Growth and per-account accrual are computed in 256 bits
//! (512 bits for the final product), so multiplication always happens before
//! division and a dust-sized total stake cannot push the accumulator out of
//! range. Results narrow to `u128` only when an account's reward is paid.

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point scale of the accumulator: 1.0 == 10^18.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Compute `floor(a * b / divisor)` for `u128` operands.
///
/// The product is formed in 256 bits. Returns `None` when `divisor` is zero
/// or the quotient does not fit in a `u128`.
pub fn mul_div(a: u128, b: u128, divisor: u128) -> Option<u128> {
    if divisor == 0 {
        return None;
    }
    let quotient = U256::from(a).full_mul(U256::from(b)) / U512::from(divisor);
    narrow(quotient)
}

fn narrow(value: U512) -> Option<u128> {
    if value.bits() > 128 {
        return None;
    }
    Some(value.low_u128())
}

/// Cumulative reward per unit of stake since inception, scaled by [`SCALE`].
///
/// Never decreases over the lifetime of a pool.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Accumulator(U256);

impl Accumulator {
    pub const ZERO: Self = Self(U256([0; 4]));

    pub fn from_raw(raw: impl Into<U256>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Scaled growth produced by distributing `elapsed * rate` reward units
    /// across `total_stake` units: `elapsed * rate * SCALE / total_stake`.
    ///
    /// Returns `None` only when `total_stake` is zero.
    pub fn growth(elapsed: u64, rate: u128, total_stake: u128) -> Option<U256> {
        if total_stake == 0 {
            return None;
        }
        // < 2^64 * 2^128 * 2^60, always fits in 256 bits.
        let emitted = U256::from(elapsed).checked_mul(U256::from(rate))?;
        emitted
            .checked_mul(U256::from(SCALE))?
            .checked_div(U256::from(total_stake))
    }

    /// Advance by a raw scaled delta.
    pub fn checked_advance(self, delta: U256) -> Option<Self> {
        self.0.checked_add(delta).map(Self)
    }

    /// Reward earned by `balance` units of stake between `checkpoint` and
    /// this accumulator value: `balance * (self - checkpoint) / SCALE`.
    ///
    /// Returns `None` if `checkpoint` is ahead of `self` or the reward does
    /// not fit in a `u128`.
    pub fn accrued_since(&self, checkpoint: Accumulator, balance: u128) -> Option<u128> {
        let delta = self.0.checked_sub(checkpoint.0)?;
        narrow(U256::from(balance).full_mul(delta) / U512::from(SCALE))
    }
}

impl From<u128> for Accumulator {
    fn from(raw: u128) -> Self {
        Self(U256::from(raw))
    }
}

impl fmt::Display for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = U256::from(SCALE);
        let fraction = (self.0 % scale).low_u128();
        write!(f, "{}.{:018}", self.0 / scale, fraction)
    }
}
