//! # Holdem Engine
//!
//! A server-authoritative engine for multiplayer Texas Hold'em tables.
//!
//! The engine tracks seats, chips, community cards, and betting rounds,
//! enforces legal turn-taking, resolves all-in side pots, determines
//! showdown winners, and produces a per-viewer redacted snapshot of table
//! state for real-time broadcast.
//!
//! ## Architecture
//!
//! The crate is split into two layers:
//!
//! - [`game`]: the pure, synchronous poker core. [`game::Table`] is the
//!   state machine driving a single hand lifecycle
//!   (`WAITING_FOR_PLAYERS` through the betting streets to `SHOWDOWN` and
//!   `HAND_COMPLETE`), owning seats, the deck, and the pot ledger.
//! - [`table`]: the concurrency layer. Each table runs as a
//!   [`table::TableActor`] on its own tokio task with an mpsc inbox, so
//!   all mutations of one table are serialized while independent tables
//!   run in parallel. [`table::TurnScheduler`] drives action timeouts and
//!   delayed hand transitions with generation-tagged, cancelable timers.
//!   [`table::TableRegistry`] owns the table-id to handle map.
//!
//! Authentication, HTTP, and the transport mechanism itself are external
//! collaborators: the engine only consumes a player identity and a
//! [`table::Transport`] capable of delivering JSON-serializable events.
//!
//! ## Example
//!
//! ```
//! use holdem_engine::game::{Table, entities::Player};
//!
//! let mut table = Table::new(1, "Table 1", 1_000);
//! table.join(Player::new("conn-1", "p1", "alice", 10_000));
//! table.sit_down(&"conn-1".to_string(), 1, 1_000).unwrap();
//! ```

/// Core game logic: entities, hand evaluation, pots, and the table state
/// machine.
pub mod game;
pub use game::{
    Table, TableError,
    constants::{self, DEFAULT_BUY_IN, DEFAULT_MIN_BET, MAX_SEATS},
    entities, evaluator,
    view::{SeatView, TableView, project},
};

/// Concurrency layer: table actors, timers, registry, and wire messages.
pub mod table;
pub use table::{
    TableActor, TableConfig, TableHandle, TableRegistry, Transport,
    messages::{TableEvent, TableMessage, TableSummary},
    scheduler::TurnScheduler,
};
