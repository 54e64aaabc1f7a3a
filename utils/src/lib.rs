//! Shared utilities for the Trickle workspace.

pub mod logging;
pub mod spans;

pub use logging::{init_logging, LogFormat};
