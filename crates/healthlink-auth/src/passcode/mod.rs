//! Link gate evaluation.

pub mod guard;

pub use guard::{GateDecision, PasscodeGuard};
