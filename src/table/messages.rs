//! Actor inbox messages, outbound events, and the transport seam.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::game::TableError;
use crate::game::entities::{Chips, ConnectionId, Player, SeatNumber, TableId};
use crate::game::view::TableView;

/// Everything a [`TableActor`](super::TableActor) can be asked to do.
///
/// Request variants carry a oneshot reply channel; timer variants are
/// fire-and-forget and carry the generation they were armed under.
#[derive(Debug)]
pub enum TableMessage {
    Join {
        player: Player,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Leave {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    SitDown {
        connection_id: ConnectionId,
        seat_number: SeatNumber,
        buy_in: Chips,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    StandUp {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<Chips, TableError>>,
    },
    Rebuy {
        connection_id: ConnectionId,
        amount: Chips,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    SitOut {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    SitIn {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Fold {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Check {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Call {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Raise {
        connection_id: ConnectionId,
        amount: Chips,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Chat {
        connection_id: ConnectionId,
        text: String,
    },
    GetSnapshot {
        connection_id: ConnectionId,
        reply: oneshot::Sender<TableView>,
    },
    Summary {
        reply: oneshot::Sender<TableSummary>,
    },
    TimerFired {
        generation: u64,
        kind: TimerKind,
    },
    Close,
}

/// What a scheduled timer means when it lands back in the inbox.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerKind {
    /// The seat holding the turn ran out of time and folds.
    TurnTimeout { seat: SeatNumber },
    /// Start the next hand, or fall back to waiting for players.
    HandTransition,
}

/// Events pushed to clients over the [`Transport`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableEvent {
    /// A redacted view of one table, optionally accompanied by a chat or
    /// game message.
    #[serde(rename_all = "camelCase")]
    TableSnapshot {
        table: TableView,
        message: Option<String>,
        from: Option<String>,
    },
    /// Sent to a connection after it joins a table.
    #[serde(rename_all = "camelCase")]
    TableJoined {
        table_id: TableId,
        tables: Vec<TableSummary>,
    },
    /// Sent to a connection after it leaves a table.
    #[serde(rename_all = "camelCase")]
    TableLeft {
        table_id: TableId,
        tables: Vec<TableSummary>,
    },
    /// Lobby refresh broadcast whenever occupancy changes.
    #[serde(rename_all = "camelCase")]
    TablesUpdated { tables: Vec<TableSummary> },
}

/// Lobby-level description of one table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub id: TableId,
    pub name: String,
    /// The table's buy-in.
    pub limit: Chips,
    pub max_players: usize,
    pub current_number_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

/// Delivery seam between table actors and whatever carries bytes to
/// clients (websockets in production, a recording stub in tests).
pub trait Transport: Send + Sync + 'static {
    /// Deliver an event to one connection. Must not block.
    fn send(&self, connection_id: &ConnectionId, event: &TableEvent);

    /// Deliver an event to every connection.
    fn broadcast(&self, event: &TableEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_their_type() {
        let event = TableEvent::TableJoined {
            table_id: 3,
            tables: vec![TableSummary {
                id: 3,
                name: "Main".to_string(),
                limit: 1_000,
                max_players: 5,
                current_number_players: 2,
                small_blind: 5,
                big_blind: 10,
            }],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tableJoined");
        assert_eq!(json["tableId"], 3);
        assert_eq!(json["tables"][0]["maxPlayers"], 5);
        assert_eq!(json["tables"][0]["currentNumberPlayers"], 2);

        let back: TableEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn lobby_update_serializes_empty() {
        let event = TableEvent::TablesUpdated { tables: Vec::new() };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"tablesUpdated","tables":[]}"#);
    }
}
