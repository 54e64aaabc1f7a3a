//! Pre-built [`tracing::Span`] constructors for ledger operations.
//!
//! Using consistent span names and field sets makes it easy to filter,
//! search, and correlate traces of a single account's history.

use std::fmt::Display;
use tracing::{info_span, Span};

/// Span covering one account-initiated operation (deposit, withdraw, claim, fund).
pub fn account_op_span(op: &'static str, account: &impl Display, amount: u128) -> Span {
    info_span!("ledger_op", op, account = %account, amount)
}

/// Span covering one administrative operation.
pub fn admin_op_span(op: &'static str, caller: &impl Display) -> Span {
    info_span!("ledger_admin", op, caller = %caller)
}
