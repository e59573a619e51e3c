//! The table state machine.
//!
//! A [`Table`] owns everything about one game: the seat array, the roster
//! of joined players, the deck, the board, and the pot ledger. It drives
//! the hand lifecycle
//!
//! ```text
//! WAITING_FOR_PLAYERS -> PREFLOP_BETTING -> FLOP_BETTING
//!     -> TURN_BETTING -> RIVER_BETTING -> SHOWDOWN -> HAND_COMPLETE
//! ```
//!
//! with early exit to `HAND_COMPLETE` whenever a single unfolded seat
//! remains. All methods are synchronous; the actor layer serializes
//! access and supplies timers.
//!
//! Chip conservation is the load-bearing invariant: outside of buy-ins,
//! rebuys, and cash-outs, the sum of stacks, live bets, and the pot
//! ledger never changes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TableError;
use super::constants;
use super::entities::{Card, Chips, ConnectionId, Deck, Player, Seat, SeatNumber, TableId};
use super::evaluator::{self, HandValue};
use super::pot::PotLedger;

/// Lifecycle phase of the current hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandState {
    WaitingForPlayers,
    PreflopBetting,
    FlopBetting,
    TurnBetting,
    RiverBetting,
    Showdown,
    HandComplete,
}

impl HandState {
    /// Whether seat actions (fold/check/call/raise) are accepted.
    #[must_use]
    pub fn is_betting(&self) -> bool {
        matches!(
            self,
            Self::PreflopBetting | Self::FlopBetting | Self::TurnBetting | Self::RiverBetting
        )
    }
}

impl fmt::Display for HandState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            Self::PreflopBetting => "PREFLOP_BETTING",
            Self::FlopBetting => "FLOP_BETTING",
            Self::TurnBetting => "TURN_BETTING",
            Self::RiverBetting => "RIVER_BETTING",
            Self::Showdown => "SHOWDOWN",
            Self::HandComplete => "HAND_COMPLETE",
        };
        write!(f, "{repr}")
    }
}

/// A single poker table.
pub struct Table {
    id: TableId,
    name: String,
    max_seats: usize,
    /// The table's standard buy-in, used when players are auto-seated.
    buy_in: Chips,
    seats: Vec<Option<Seat>>,
    /// Everyone who joined this table, seated or not. Bankrolls live
    /// here; seats hold in-play stacks.
    players: Vec<Player>,
    board: Vec<Card>,
    deck: Deck,
    /// Deck to use for the next hand instead of a shuffled one.
    staged_deck: Option<Deck>,
    ledger: PotLedger,
    state: HandState,
    /// Seat number of the dealer button; 0 before the first hand.
    dealer: SeatNumber,
    turn: Option<SeatNumber>,
    min_bet: Chips,
    /// Smallest legal total raise target this round.
    min_raise: Chips,
    /// Total bet each active seat must match this round.
    call_amount: Chips,
    win_messages: Vec<String>,
    went_to_showdown: bool,
    /// Bumped on every hand start and reset; stamps outstanding timers so
    /// stale ones can be ignored.
    generation: u64,
}

impl Table {
    #[must_use]
    pub fn new(id: TableId, name: &str, buy_in: Chips) -> Self {
        Self::with_rules(id, name, constants::MAX_SEATS, constants::DEFAULT_MIN_BET, buy_in)
    }

    #[must_use]
    pub fn with_rules(
        id: TableId,
        name: &str,
        max_seats: usize,
        min_bet: Chips,
        buy_in: Chips,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            max_seats,
            buy_in,
            seats: vec![None; max_seats],
            players: Vec::new(),
            board: Vec::with_capacity(constants::BOARD_SIZE),
            deck: Deck::new(),
            staged_deck: None,
            ledger: PotLedger::new(),
            state: HandState::WaitingForPlayers,
            dealer: 0,
            turn: None,
            min_bet,
            min_raise: min_bet,
            call_amount: 0,
            win_messages: Vec::new(),
            went_to_showdown: false,
            generation: 0,
        }
    }

    // === Roster ===

    /// Register a player at the table. Joining again with the same player
    /// id refreshes the connection (a reconnect); otherwise any stale
    /// entry for the connection is replaced.
    pub fn join(&mut self, player: Player) {
        if let Some(existing) = self.players.iter_mut().find(|p| p.id == player.id) {
            existing.connection_id = player.connection_id.clone();
            existing.name = player.name.clone();
            for seat in self.seats.iter_mut().flatten() {
                if seat.player.id == player.id {
                    seat.player.connection_id = player.connection_id.clone();
                    seat.player.name = player.name.clone();
                }
            }
            return;
        }
        self.players.retain(|p| p.connection_id != player.connection_id);
        self.players.push(player);
    }

    #[must_use]
    pub fn player_by_connection(&self, connection_id: &ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| &p.connection_id == connection_id)
    }

    #[must_use]
    pub fn seat_by_connection(&self, connection_id: &ConnectionId) -> Option<SeatNumber> {
        self.seats
            .iter()
            .flatten()
            .find(|s| &s.player.connection_id == connection_id)
            .map(|s| s.number)
    }

    #[must_use]
    pub fn first_open_seat(&self) -> Option<SeatNumber> {
        (1..=self.max_seats).find(|&n| self.seats[n - 1].is_none())
    }

    // === Seating ===

    /// Take a seat, moving `buy_in` chips from the player's bankroll onto
    /// the table. The new seat waits for the next hand.
    pub fn sit_down(
        &mut self,
        connection_id: &ConnectionId,
        seat_number: SeatNumber,
        buy_in: Chips,
    ) -> Result<(), TableError> {
        if seat_number == 0 || seat_number > self.max_seats {
            return Err(TableError::NotFound);
        }
        let player = self
            .player_by_connection(connection_id)
            .cloned()
            .ok_or(TableError::NotFound)?;
        if self.seat_by_connection(connection_id).is_some() {
            return Err(TableError::IllegalAction("already seated".into()));
        }
        if buy_in == 0 {
            return Err(TableError::Validation("buy-in must be positive".into()));
        }
        if buy_in > player.bankroll || self.seats[seat_number - 1].is_some() {
            return Err(TableError::InvalidBuyIn);
        }
        if let Some(roster) = self.players.iter_mut().find(|p| p.id == player.id) {
            roster.bankroll -= buy_in;
        }
        self.seats[seat_number - 1] = Some(Seat::new(seat_number, player, buy_in));
        Ok(())
    }

    /// Vacate the seat, folding first if a hand is live, and return the
    /// stack to the player's bankroll.
    pub fn stand_up(&mut self, connection_id: &ConnectionId) -> Result<Chips, TableError> {
        let seat_number = self
            .seat_by_connection(connection_id)
            .ok_or(TableError::NotFound)?;
        self.abandon_seat(seat_number);
        let Some(seat) = self.seats[seat_number - 1].take() else {
            return Err(TableError::NotFound);
        };
        let stack = seat.stack;
        if let Some(roster) = self.players.iter_mut().find(|p| p.id == seat.player.id) {
            roster.bankroll += stack;
        }
        Ok(stack)
    }

    /// Remove the player from the table entirely, cashing out any seat.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Result<(), TableError> {
        if self.seat_by_connection(connection_id).is_some() {
            self.stand_up(connection_id)?;
        }
        let before = self.players.len();
        self.players.retain(|p| &p.connection_id != connection_id);
        if self.players.len() == before {
            return Err(TableError::NotFound);
        }
        Ok(())
    }

    /// Add chips to a seated stack between hands.
    pub fn rebuy(&mut self, connection_id: &ConnectionId, amount: Chips) -> Result<(), TableError> {
        if self.state.is_betting() || self.state == HandState::Showdown {
            return Err(TableError::IllegalAction("a hand is in progress".into()));
        }
        let seat_number = self
            .seat_by_connection(connection_id)
            .ok_or(TableError::NotFound)?;
        if amount == 0 {
            return Err(TableError::Validation("rebuy must be positive".into()));
        }
        let Some(seat) = &self.seats[seat_number - 1] else {
            return Err(TableError::NotFound);
        };
        let player_id = seat.player.id.clone();
        let Some(roster) = self.players.iter_mut().find(|p| p.id == player_id) else {
            return Err(TableError::NotFound);
        };
        if amount > roster.bankroll {
            return Err(TableError::InvalidBuyIn);
        }
        roster.bankroll -= amount;
        if let Some(seat) = &mut self.seats[seat_number - 1] {
            seat.stack += amount;
        }
        Ok(())
    }

    /// Sit out of future hands. If a hand is live the seat folds now.
    pub fn sit_out(&mut self, connection_id: &ConnectionId) -> Result<(), TableError> {
        let seat_number = self
            .seat_by_connection(connection_id)
            .ok_or(TableError::NotFound)?;
        let in_hand = match &mut self.seats[seat_number - 1] {
            Some(seat) => {
                seat.sitting_out = true;
                self.state.is_betting() && seat.in_hand()
            }
            None => false,
        };
        if in_hand {
            self.fold_seat(seat_number);
        }
        Ok(())
    }

    /// Rejoin the rotation from the next hand.
    pub fn sit_in(&mut self, connection_id: &ConnectionId) -> Result<(), TableError> {
        let seat_number = self
            .seat_by_connection(connection_id)
            .ok_or(TableError::NotFound)?;
        if let Some(seat) = &mut self.seats[seat_number - 1] {
            seat.sitting_out = false;
        }
        Ok(())
    }

    // === Hand lifecycle ===

    /// Whether at least two seated players can be dealt in.
    #[must_use]
    pub fn can_start_hand(&self) -> bool {
        self.seats
            .iter()
            .flatten()
            .filter(|s| !s.sitting_out && s.stack > 0)
            .count()
            >= 2
    }

    /// Deal a new hand: rotate the button, post blinds, deal hole cards,
    /// and open preflop betting. Returns `false` without mutation if too
    /// few players are ready.
    pub fn start_hand(&mut self) -> bool {
        if !self.can_start_hand() {
            return false;
        }
        self.generation += 1;
        self.board.clear();
        self.ledger.clear();
        self.win_messages.clear();
        self.went_to_showdown = false;
        self.deck = self.staged_deck.take().unwrap_or_default();

        for seat in self.seats.iter_mut().flatten() {
            if seat.sitting_out || seat.stack == 0 {
                seat.clear_hand();
            } else {
                seat.prepare_for_hand();
            }
        }

        // Participants are exactly the seats prepare_for_hand unfolded.
        self.dealer = match self.next_seat_after(self.dealer, |s| !s.folded) {
            Some(n) => n,
            None => return false,
        };
        let Some(small_blind) = self.next_seat_after(self.dealer, |s| !s.folded) else {
            return false;
        };
        let Some(big_blind) = self.next_seat_after(small_blind, |s| !s.folded) else {
            return false;
        };
        if let Some(seat) = &mut self.seats[small_blind - 1] {
            seat.post_blind(self.min_bet / 2);
        }
        if let Some(seat) = &mut self.seats[big_blind - 1] {
            seat.post_blind(self.min_bet);
        }
        self.call_amount = self.min_bet;
        self.min_raise = 2 * self.min_bet;

        // Two cards each, dealt one at a time starting left of the button.
        let mut order = Vec::new();
        let mut n = small_blind;
        loop {
            order.push(n);
            n = match self.next_seat_after(n, |s| !s.folded) {
                Some(next) if next != small_blind => next,
                _ => break,
            };
        }
        for _ in 0..constants::HOLE_CARDS {
            for &seat_number in &order {
                let Some(card) = self.deck.draw() else {
                    log::error!("table {}: deck exhausted while dealing", self.id);
                    self.reset_to_waiting();
                    return false;
                };
                if let Some(seat) = &mut self.seats[seat_number - 1] {
                    seat.hole_cards.push(card);
                }
            }
        }

        self.state = HandState::PreflopBetting;
        log::info!(
            "table {}: hand started, dealer seat {}, blinds {}/{}",
            self.id,
            self.dealer,
            self.min_bet / 2,
            self.min_bet
        );
        if self.round_closed() {
            // Blinds put everyone all-in; run the board out.
            self.settle_round();
        } else {
            let first = self.next_actor_after(big_blind);
            self.set_turn(first);
        }
        true
    }

    // === Seat actions ===

    pub fn fold(&mut self, connection_id: &ConnectionId) -> Result<String, TableError> {
        let seat_number = self.acting_seat(connection_id)?;
        let name = self.seat_name(seat_number);
        self.fold_seat(seat_number);
        Ok(format!("{name} folds"))
    }

    pub fn check(&mut self, connection_id: &ConnectionId) -> Result<String, TableError> {
        let seat_number = self.acting_seat(connection_id)?;
        let Some(seat) = &mut self.seats[seat_number - 1] else {
            return Err(TableError::NotFound);
        };
        if seat.current_bet < self.call_amount {
            return Err(TableError::IllegalAction("cannot check a live bet".into()));
        }
        let name = seat.player.name.clone();
        seat.check();
        self.advance_turn(seat_number);
        Ok(format!("{name} checks"))
    }

    /// Match the current bet, going all-in for less if short.
    pub fn call(&mut self, connection_id: &ConnectionId) -> Result<String, TableError> {
        let seat_number = self.acting_seat(connection_id)?;
        let call_amount = self.call_amount;
        let Some(seat) = &mut self.seats[seat_number - 1] else {
            return Err(TableError::NotFound);
        };
        let name = seat.player.name.clone();
        let moved = seat.call(call_amount);
        self.advance_turn(seat_number);
        Ok(format!("{name} calls {moved}"))
    }

    /// Raise the round's total bet to `amount`.
    pub fn raise(
        &mut self,
        connection_id: &ConnectionId,
        amount: Chips,
    ) -> Result<String, TableError> {
        let seat_number = self.acting_seat(connection_id)?;
        if amount == 0 {
            return Err(TableError::Validation("raise amount must be positive".into()));
        }
        if amount < self.min_raise {
            return Err(TableError::IllegalAction(format!(
                "raise must be at least {}",
                self.min_raise
            )));
        }
        let previous_call = self.call_amount;
        let Some(seat) = &mut self.seats[seat_number - 1] else {
            return Err(TableError::NotFound);
        };
        let name = seat.player.name.clone();
        seat.raise_to(amount)?;
        self.call_amount = amount;
        self.min_raise = amount + (amount - previous_call);
        // A raise reopens the action for everyone else.
        for seat in self.seats.iter_mut().flatten() {
            if seat.number != seat_number && seat.in_hand() && seat.stack > 0 {
                seat.acted_this_round = false;
            }
        }
        self.advance_turn(seat_number);
        Ok(format!("{name} raises to {amount}"))
    }

    /// Fold the turn holder without a client action (turn timeout).
    pub fn force_fold(&mut self, seat_number: SeatNumber) -> Option<String> {
        if !self.state.is_betting() || self.turn != Some(seat_number) {
            return None;
        }
        let name = self.seat_name(seat_number);
        log::info!("table {}: seat {seat_number} folded on timeout", self.id);
        self.fold_seat(seat_number);
        Some(format!("{name} folds (time)"))
    }

    /// Use `deck` for the next hand instead of shuffling.
    pub fn stage_deck(&mut self, deck: Deck) {
        self.staged_deck = Some(deck);
    }

    /// Abort whatever is in progress and return to the lobby state.
    /// Collected and wagered chips go back to the stacks they came from.
    pub fn reset_to_waiting(&mut self) {
        self.generation += 1;
        for seat in self.seats.iter_mut().flatten() {
            seat.stack += seat.current_bet + self.ledger.contribution(seat.number);
            seat.clear_hand();
        }
        self.ledger.clear();
        self.board.clear();
        self.win_messages.clear();
        self.went_to_showdown = false;
        self.turn = None;
        self.state = HandState::WaitingForPlayers;
    }

    // === Accessors ===

    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn max_seats(&self) -> usize {
        self.max_seats
    }

    #[must_use]
    pub fn buy_in(&self) -> Chips {
        self.buy_in
    }

    #[must_use]
    pub fn state(&self) -> HandState {
        self.state
    }

    #[must_use]
    pub fn turn(&self) -> Option<SeatNumber> {
        self.turn
    }

    #[must_use]
    pub fn seat(&self, seat_number: SeatNumber) -> Option<&Seat> {
        self.seats.get(seat_number.checked_sub(1)?)?.as_ref()
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().flatten()
    }

    #[must_use]
    pub fn seated_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn pot_total(&self) -> Chips {
        self.ledger.total() + self.seats.iter().flatten().map(|s| s.current_bet).sum::<Chips>()
    }

    #[must_use]
    pub fn min_bet(&self) -> Chips {
        self.min_bet
    }

    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    #[must_use]
    pub fn call_amount(&self) -> Chips {
        self.call_amount
    }

    #[must_use]
    pub fn win_messages(&self) -> &[String] {
        &self.win_messages
    }

    #[must_use]
    pub fn went_to_showdown(&self) -> bool {
        self.went_to_showdown
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Total chips on the table: stacks plus live bets plus the pot.
    /// Constant between buy-in boundaries.
    #[must_use]
    pub fn chips_in_play(&self) -> Chips {
        self.seats
            .iter()
            .flatten()
            .map(|s| s.stack + s.current_bet)
            .sum::<Chips>()
            + self.ledger.total()
    }

    // === Internals ===

    /// First seat after `from` (wrapping, excluding `from`) whose
    /// occupant satisfies `pred`. `from == 0` starts the scan at seat 1.
    fn next_seat_after(
        &self,
        from: SeatNumber,
        pred: impl Fn(&Seat) -> bool,
    ) -> Option<SeatNumber> {
        for i in 1..=self.max_seats {
            let n = ((from + i - 1) % self.max_seats) + 1;
            if let Some(seat) = &self.seats[n - 1] {
                if pred(seat) {
                    return Some(n);
                }
            }
        }
        None
    }

    /// Next seat after `from` that still owes a decision this round.
    fn next_actor_after(&self, from: SeatNumber) -> Option<SeatNumber> {
        let call_amount = self.call_amount;
        self.next_seat_after(from, |s| {
            s.in_hand() && s.stack > 0 && (!s.acted_this_round || s.current_bet < call_amount)
        })
    }

    fn seat_name(&self, seat_number: SeatNumber) -> String {
        self.seat(seat_number)
            .map(|s| s.player.name.clone())
            .unwrap_or_default()
    }

    fn acting_seat(&self, connection_id: &ConnectionId) -> Result<SeatNumber, TableError> {
        if !self.state.is_betting() {
            return Err(TableError::IllegalAction("no betting round in progress".into()));
        }
        let seat_number = self
            .seat_by_connection(connection_id)
            .ok_or(TableError::NotFound)?;
        if self.turn != Some(seat_number) {
            return Err(TableError::IllegalAction("not your turn".into()));
        }
        Ok(seat_number)
    }

    fn set_turn(&mut self, seat_number: Option<SeatNumber>) {
        self.turn = seat_number;
        for seat in self.seats.iter_mut().flatten() {
            seat.turn = Some(seat.number) == seat_number;
        }
    }

    /// Fold a seat and move the game forward. Used by the fold action,
    /// timeouts, sit-outs, and seat abandonment.
    fn fold_seat(&mut self, seat_number: SeatNumber) {
        if let Some(seat) = &mut self.seats[seat_number - 1] {
            seat.fold();
        }
        self.ledger.mark_folded(seat_number);
        if self.turn == Some(seat_number) {
            self.advance_turn(seat_number);
        } else if let Some(survivor) = self.sole_survivor() {
            self.award_uncontested(survivor);
        } else if self.state.is_betting() && self.round_closed() {
            self.settle_round();
        }
    }

    fn sole_survivor(&self) -> Option<SeatNumber> {
        let mut in_hand = self.seats.iter().flatten().filter(|s| s.in_hand());
        let survivor = in_hand.next()?;
        match in_hand.next() {
            None => Some(survivor.number),
            Some(_) => None,
        }
    }

    /// Whether the betting round is over: every live bet is matched, and
    /// either everyone with chips has had their say or too few seats can
    /// still act for betting to mean anything.
    fn round_closed(&self) -> bool {
        let actors: Vec<&Seat> = self
            .seats
            .iter()
            .flatten()
            .filter(|s| s.in_hand() && s.stack > 0)
            .collect();
        if actors.iter().any(|s| s.current_bet < self.call_amount) {
            return false;
        }
        actors.len() < 2 || actors.iter().all(|s| s.acted_this_round)
    }

    /// Move the turn after `from` acted, settling the round or ending the
    /// hand when nothing is left to decide.
    fn advance_turn(&mut self, from: SeatNumber) {
        if let Some(survivor) = self.sole_survivor() {
            self.award_uncontested(survivor);
            return;
        }
        if self.round_closed() {
            self.settle_round();
            return;
        }
        let next = self.next_actor_after(from);
        self.set_turn(next);
    }

    /// Sweep round bets into the ledger and move to the next street, or
    /// to showdown after the river. Streets with no possible action are
    /// run out automatically.
    fn settle_round(&mut self) {
        for seat in self.seats.iter_mut().flatten() {
            if seat.current_bet > 0 {
                let all_in = seat.stack == 0 && !seat.folded;
                self.ledger
                    .collect(seat.number, seat.current_bet, seat.folded, all_in);
                seat.current_bet = 0;
            }
            if seat.folded {
                self.ledger.mark_folded(seat.number);
            }
            seat.acted_this_round = false;
            if seat.in_hand() {
                seat.last_action = None;
            }
        }
        self.call_amount = 0;
        self.min_raise = self.min_bet;
        self.set_turn(None);

        let dealt = match self.state {
            HandState::PreflopBetting => {
                self.state = HandState::FlopBetting;
                self.deal_to_board(3)
            }
            HandState::FlopBetting => {
                self.state = HandState::TurnBetting;
                self.deal_to_board(1)
            }
            HandState::TurnBetting => {
                self.state = HandState::RiverBetting;
                self.deal_to_board(1)
            }
            HandState::RiverBetting => {
                self.showdown();
                return;
            }
            _ => return,
        };
        if !dealt {
            return;
        }
        if self.round_closed() {
            self.settle_round();
        } else {
            let first = self.next_actor_after(self.dealer);
            self.set_turn(first);
        }
    }

    fn deal_to_board(&mut self, count: usize) -> bool {
        for _ in 0..count {
            match self.deck.draw() {
                Some(card) => self.board.push(card),
                None => {
                    log::error!("table {}: deck exhausted dealing the board", self.id);
                    self.reset_to_waiting();
                    return false;
                }
            }
        }
        true
    }

    /// Everyone else folded: the survivor takes the whole pot unseen.
    fn award_uncontested(&mut self, seat_number: SeatNumber) {
        for seat in self.seats.iter_mut().flatten() {
            if seat.current_bet > 0 {
                self.ledger
                    .collect(seat.number, seat.current_bet, seat.folded, false);
                seat.current_bet = 0;
            }
        }
        let total = self.ledger.total();
        let name = self.seat_name(seat_number);
        if let Some(seat) = &mut self.seats[seat_number - 1] {
            seat.win_hand(total);
        }
        self.win_messages.push(format!("{name} wins ${total}"));
        log::info!("table {}: {name} wins ${total} uncontested", self.id);
        self.finish_hand();
    }

    /// Compare the remaining hands and pay out every pot layer.
    fn showdown(&mut self) {
        self.state = HandState::Showdown;
        self.went_to_showdown = true;
        self.set_turn(None);

        let pots = self.ledger.pots();
        let pot_sum: Chips = pots.iter().map(|p| p.amount).sum();
        if pot_sum != self.ledger.total() {
            log::error!(
                "table {}: pot layers sum to {pot_sum}, ledger holds {}",
                self.id,
                self.ledger.total()
            );
            self.reset_to_waiting();
            return;
        }

        let mut strengths: BTreeMap<SeatNumber, HandValue> = BTreeMap::new();
        for seat in self.seats.iter().flatten() {
            if seat.in_hand() {
                let mut cards = seat.hole_cards.clone();
                cards.extend_from_slice(&self.board);
                strengths.insert(seat.number, evaluator::evaluate(&cards));
            }
        }

        for pot in pots {
            let contenders: Vec<SeatNumber> = pot
                .eligible
                .iter()
                .copied()
                .filter(|n| strengths.contains_key(n))
                .collect();
            if contenders.is_empty() {
                log::error!("table {}: pot of {} has no contenders", self.id, pot.amount);
                self.reset_to_waiting();
                return;
            }
            let values: Vec<HandValue> = contenders
                .iter()
                .filter_map(|n| strengths.get(n).cloned())
                .collect();
            let winners: Vec<SeatNumber> = evaluator::best_indices(&values)
                .into_iter()
                .map(|i| contenders[i])
                .collect();
            let share = pot.amount / winners.len() as Chips;
            let mut remainder = pot.amount % winners.len() as Chips;
            // Odd chips go to the winners closest to the dealer's left.
            let mut ordered = Vec::new();
            let mut n = self.dealer;
            for _ in 0..self.max_seats {
                n = (n % self.max_seats) + 1;
                if winners.contains(&n) {
                    ordered.push(n);
                }
            }
            for seat_number in ordered {
                let mut amount = share;
                if remainder > 0 {
                    amount += 1;
                    remainder -= 1;
                }
                let name = self.seat_name(seat_number);
                let rank = strengths
                    .get(&seat_number)
                    .map(|v| v.rank.to_string())
                    .unwrap_or_default();
                if let Some(seat) = &mut self.seats[seat_number - 1] {
                    seat.win_hand(amount);
                }
                self.win_messages.push(format!("{name} wins ${amount} with {rank}"));
                log::info!("table {}: {name} wins ${amount} with {rank}", self.id);
            }
        }
        self.finish_hand();
    }

    /// Close out the hand, leaving the board and revealed cards on
    /// display until the next hand starts.
    fn finish_hand(&mut self) {
        self.ledger.clear();
        self.call_amount = 0;
        self.min_raise = self.min_bet;
        self.set_turn(None);
        self.state = HandState::HandComplete;
    }

    /// Detach a seat from the live hand before vacating it. Any chips the
    /// seat has wagered stay in the pot.
    fn abandon_seat(&mut self, seat_number: SeatNumber) {
        let live = self
            .seat(seat_number)
            .is_some_and(|s| self.state.is_betting() && s.in_hand());
        if live {
            self.fold_seat(seat_number);
        }
        // Sweep any leftover wager (blinds posted, folded bets) so the
        // chips stay on the table after the seat empties.
        if let Some(seat) = &mut self.seats[seat_number - 1] {
            if seat.current_bet > 0 {
                self.ledger.collect(seat.number, seat.current_bet, true, false);
                self.ledger.mark_folded(seat.number);
                seat.current_bet = 0;
            }
        }
    }
}
