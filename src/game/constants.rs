//! Table-wide constants.

use super::entities::Chips;

/// Number of seats at a table.
pub const MAX_SEATS: usize = 5;

/// Default big-blind unit.
pub const DEFAULT_MIN_BET: Chips = 10;

/// Default buy-in used when a player is auto-seated on join.
pub const DEFAULT_BUY_IN: Chips = 1_000;

/// Hole cards dealt to each seat.
pub const HOLE_CARDS: usize = 2;

/// Community cards on a full board.
pub const BOARD_SIZE: usize = 5;

/// Milliseconds a seat has to act before it is force-folded.
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 15_000;

/// Milliseconds between the end of one hand and the start of the next.
pub const DEFAULT_NEXT_HAND_DELAY_MS: u64 = 5_000;
