use serde::{Deserialize, Serialize};

use crate::game::TableError;
use crate::game::constants;
use crate::game::entities::Chips;

/// Static parameters for one table, fixed at creation time.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    pub name: String,
    pub max_seats: usize,
    /// The big blind; the small blind is half of it.
    pub min_bet: Chips,
    /// Stack granted when a player is auto-seated, and the table's
    /// advertised limit.
    pub buy_in: Chips,
    pub turn_timeout_ms: u64,
    pub next_hand_delay_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Table".to_string(),
            max_seats: constants::MAX_SEATS,
            min_bet: constants::DEFAULT_MIN_BET,
            buy_in: constants::DEFAULT_BUY_IN,
            turn_timeout_ms: constants::DEFAULT_TURN_TIMEOUT_MS,
            next_hand_delay_ms: constants::DEFAULT_NEXT_HAND_DELAY_MS,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), TableError> {
        if self.name.trim().is_empty() {
            return Err(TableError::Validation("table name must not be empty".into()));
        }
        if self.max_seats < 2 {
            return Err(TableError::Validation("a table needs at least 2 seats".into()));
        }
        if self.min_bet < 2 || self.min_bet % 2 != 0 {
            return Err(TableError::Validation(
                "min bet must be even so the small blind is whole".into(),
            ));
        }
        if self.buy_in < self.min_bet {
            return Err(TableError::Validation("buy-in must cover the big blind".into()));
        }
        Ok(())
    }
}
