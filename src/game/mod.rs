//! Poker game core.
//!
//! Everything in this module is synchronous and deterministic given a
//! deck: the actor layer in [`crate::table`] wraps a [`Table`] to add
//! timers and message serialization, but all poker rules live here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod constants;
pub mod entities;
pub mod evaluator;
pub mod pot;
pub mod table;
pub mod view;

pub use table::{HandState, Table};

/// Errors surfaced to the acting connection.
///
/// Internal invariant violations (deck exhaustion, pot-sum mismatch) are
/// never represented here; the table logs them and resets itself instead.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    /// Malformed or out-of-range action payload.
    #[error("invalid request: {0}")]
    Validation(String),
    /// Action inconsistent with the current state or turn.
    #[error("action not allowed: {0}")]
    IllegalAction(String),
    /// A raise target that cannot be met by the seat's stack. Calls never
    /// produce this; they clamp to all-in instead.
    #[error("not enough chips")]
    InsufficientChips,
    /// Seat occupied, or buy-in/rebuy amount exceeds the bankroll.
    #[error("invalid buy-in")]
    InvalidBuyIn,
    /// Unknown table, seat, or connection.
    #[error("unknown table or seat")]
    NotFound,
}
