//! Per-viewer table snapshots.
//!
//! The engine never trusts clients with hidden state, so every broadcast
//! goes through [`project`], which rebuilds the table as one specific
//! connection is allowed to see it: their own hole cards in the clear,
//! everyone else's replaced by hidden placeholders unless the showdown
//! revealed them. Views are plain serde structs; the transport ships
//! them as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::constants;
use super::entities::{Card, Chips, ConnectionId, Seat, SeatAction, SeatNumber, TableId};
use super::table::{HandState, Table};

/// Public identity of a seat's occupant. Connection ids stay private.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPlayerView {
    pub id: String,
    pub name: String,
}

/// One seat as a given viewer sees it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub seat_number: SeatNumber,
    pub player: SeatPlayerView,
    pub stack: Chips,
    pub bet: Chips,
    pub hand: Vec<Card>,
    pub turn: bool,
    pub folded: bool,
    pub sitting_out: bool,
    pub last_action: Option<SeatAction>,
}

/// A full table snapshot, redacted for one viewer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: TableId,
    pub name: String,
    pub max_seats: usize,
    pub state: HandState,
    pub board: Vec<Card>,
    pub seats: BTreeMap<SeatNumber, Option<SeatView>>,
    pub min_bet: Chips,
    pub min_raise: Chips,
    pub call_amount: Chips,
    pub pot: Chips,
    pub win_messages: Vec<String>,
    pub went_to_showdown: bool,
}

/// Build the snapshot of `table` that `viewer` is allowed to see.
///
/// A seat's cards are visible when the seat belongs to the viewer, or
/// when the hand went to showdown and the seat won a pot; everyone else
/// with cards shows two hidden placeholders. Folded and mucked hands are
/// never revealed.
#[must_use]
pub fn project(table: &Table, viewer: &ConnectionId) -> TableView {
    let mut seats = BTreeMap::new();
    for seat_number in 1..=table.max_seats() {
        seats.insert(seat_number, table.seat(seat_number).map(|s| project_seat(s, table, viewer)));
    }
    TableView {
        id: table.id(),
        name: table.name().to_string(),
        max_seats: table.max_seats(),
        state: table.state(),
        board: table.board().to_vec(),
        seats,
        min_bet: table.min_bet(),
        min_raise: table.min_raise(),
        call_amount: table.call_amount(),
        pot: table.pot_total(),
        win_messages: table.win_messages().to_vec(),
        went_to_showdown: table.went_to_showdown(),
    }
}

fn project_seat(seat: &Seat, table: &Table, viewer: &ConnectionId) -> SeatView {
    let own = &seat.player.connection_id == viewer;
    let revealed =
        own || (table.went_to_showdown() && seat.last_action == Some(SeatAction::Winner));
    let hand = if revealed || seat.hole_cards.is_empty() {
        seat.hole_cards.clone()
    } else {
        vec![Card::HIDDEN; constants::HOLE_CARDS]
    };
    SeatView {
        seat_number: seat.number,
        player: SeatPlayerView {
            id: seat.player.id.clone(),
            name: seat.player.name.clone(),
        },
        stack: seat.stack,
        bet: seat.current_bet,
        hand,
        turn: seat.turn,
        folded: seat.folded,
        sitting_out: seat.sitting_out,
        last_action: seat.last_action,
    }
}
