use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TableError, constants};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
    // Used for the redaction placeholder sent to other viewers.
    Hidden,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Hidden => "?",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values (2u8..=14u8, ace high; 0u8 is hidden).
pub type Value = u8;

/// A card is a tuple of a value and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    /// The fixed placeholder standing in for another seat's hole card.
    pub const HIDDEN: Card = Card(0, Suit::Hidden);
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "?")?,
            11 => write!(f, "J")?,
            12 => write!(f, "Q")?,
            13 => write!(f, "K")?,
            14 => write!(f, "A")?,
            v => write!(f, "{v}")?,
        }
        write!(f, "{}", self.1)
    }
}

/// A shuffled 52-card deck owned by one table for the duration of a hand.
///
/// The deck is built and shuffled once per hand; cards come off the top,
/// which is equivalent to drawing uniformly at random without
/// replacement. 52 cards always suffice for a full table plus the board,
/// so exhaustion indicates a bug upstream.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = Vec::with_capacity(52);
        for value in 2..=14u8 {
            for suit in [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart] {
                cards.push(Card(value, suit));
            }
        }
        cards.shuffle(&mut rand::rng());
        Self { cards }
    }
}

impl Deck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a deck that yields `cards` in the given order. Useful for
    /// scripting exact deals in tests and debugging tools.
    #[must_use]
    pub fn stacked(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

/// Type alias for whole chips. All bets and stacks are whole chips.
pub type Chips = u32;

/// Transport-level handle identifying one connection.
pub type ConnectionId = String;

/// Stable player identifier issued by the session layer.
pub type PlayerId = String;

/// Seat positions are numbered 1..=max_seats; 0 is never a valid seat.
pub type SeatNumber = usize;

/// Registry-scoped table identifier.
pub type TableId = u64;

/// Player identity handed to the engine by the lobby/session layer.
///
/// `bankroll` is the authoritative chip balance outside any table; the
/// table reads and adjusts it only at buy-in, rebuy, and cash-out
/// boundaries.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub id: PlayerId,
    pub name: String,
    pub bankroll: Chips,
}

impl Player {
    #[must_use]
    pub fn new(connection_id: &str, id: &str, name: &str, bankroll: Chips) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            id: id.to_string(),
            name: name.to_string(),
            bankroll,
        }
    }
}

/// The last visible action a seat took, shown to all viewers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatAction {
    Fold,
    Check,
    Call,
    Raise,
    Winner,
}

impl fmt::Display for SeatAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds",
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Raise => "raises",
            Self::Winner => "wins",
        };
        write!(f, "{repr}")
    }
}

/// One position at the table: the occupant, their stack, their wager in
/// the current betting round, and the per-hand action flags.
///
/// Transition methods assume the [`Table`](super::Table) has already
/// verified the seat holds the turn and the action is legal.
#[derive(Clone, Debug)]
pub struct Seat {
    pub number: SeatNumber,
    pub player: Player,
    /// Chips in play at this seat.
    pub stack: Chips,
    /// Chips wagered this betting round; swept into the pot ledger when
    /// the round settles.
    pub current_bet: Chips,
    pub hole_cards: Vec<Card>,
    pub turn: bool,
    pub folded: bool,
    pub acted_this_round: bool,
    pub sitting_out: bool,
    pub last_action: Option<SeatAction>,
}

impl Seat {
    #[must_use]
    pub fn new(number: SeatNumber, player: Player, buy_in: Chips) -> Self {
        Self {
            number,
            player,
            stack: buy_in,
            current_bet: 0,
            hole_cards: Vec::with_capacity(constants::HOLE_CARDS),
            turn: false,
            // A freshly seated player waits for the next hand.
            folded: true,
            acted_this_round: false,
            sitting_out: false,
            last_action: None,
        }
    }

    /// Whether this seat is dealt into the current hand and has not folded.
    #[must_use]
    pub fn in_hand(&self) -> bool {
        !self.folded && self.hole_cards.len() == constants::HOLE_CARDS
    }

    /// An all-in seat stays in the hand but can take no further action.
    #[must_use]
    pub fn is_all_in(&self) -> bool {
        self.in_hand() && self.stack == 0
    }

    pub fn prepare_for_hand(&mut self) {
        self.hole_cards.clear();
        self.current_bet = 0;
        self.turn = false;
        self.folded = false;
        self.acted_this_round = false;
        self.last_action = None;
    }

    pub fn clear_hand(&mut self) {
        self.hole_cards.clear();
        self.current_bet = 0;
        self.turn = false;
        self.folded = true;
        self.acted_this_round = false;
        self.last_action = None;
    }

    /// Post a forced blind, clamped to the stack (a short stack goes
    /// all-in on the blind). Does not count as having acted.
    pub fn post_blind(&mut self, amount: Chips) {
        let posted = amount.min(self.stack);
        self.stack -= posted;
        self.current_bet = posted;
    }

    pub fn check(&mut self) {
        self.acted_this_round = true;
        self.turn = false;
        self.last_action = Some(SeatAction::Check);
    }

    /// Match `target_bet`, clamped to the stack (all-in for less).
    /// Returns the chips actually moved.
    pub fn call(&mut self, target_bet: Chips) -> Chips {
        let owed = target_bet.saturating_sub(self.current_bet).min(self.stack);
        self.stack -= owed;
        self.current_bet += owed;
        self.acted_this_round = true;
        self.turn = false;
        self.last_action = Some(SeatAction::Call);
        owed
    }

    /// Raise the round wager to `target_bet` total.
    pub fn raise_to(&mut self, target_bet: Chips) -> Result<(), TableError> {
        let owed = target_bet.saturating_sub(self.current_bet);
        if owed > self.stack {
            return Err(TableError::InsufficientChips);
        }
        self.stack -= owed;
        self.current_bet = target_bet;
        self.acted_this_round = true;
        self.turn = false;
        self.last_action = Some(SeatAction::Raise);
        Ok(())
    }

    /// Fold the hand. `current_bet` is left in place; it no longer
    /// represents an open claim and is swept into the pot ledger by the
    /// table's round-settlement step.
    pub fn fold(&mut self) {
        self.folded = true;
        self.turn = false;
        self.acted_this_round = true;
        self.last_action = Some(SeatAction::Fold);
    }

    pub fn win_hand(&mut self, amount: Chips) {
        self.stack += amount;
        self.turn = false;
        self.last_action = Some(SeatAction::Winner);
    }
}
