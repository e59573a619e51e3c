//! Five-card poker hand evaluation over 5 to 7 cards.
//!
//! [`evaluate`] tries every 5-card subset of the input and keeps the
//! strongest. With at most 7 cards that is 21 subsets, so the brute-force
//! scan is plenty fast for a table that evaluates a handful of hands per
//! showdown.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Card, Value};

/// Hand categories in ascending strength.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "a pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "a straight",
            Self::Flush => "a flush",
            Self::FullHouse => "a full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "a straight flush",
        };
        write!(f, "{repr}")
    }
}

/// Total strength of a best-of-5 hand.
///
/// Compares by category first, then lexicographically over `tiebreak`,
/// which holds the category-specific values in significance order (e.g.
/// for two pair: high pair, low pair, kicker). Equal values mean a split.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub rank: HandRank,
    pub tiebreak: Vec<Value>,
}

/// Evaluate the best 5-card hand available from `cards`.
///
/// # Panics
///
/// Panics if fewer than 5 cards are supplied; the table always evaluates
/// two hole cards plus a full board.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    assert!(cards.len() >= 5, "need at least 5 cards to evaluate");
    let mut best: Option<HandValue> = None;
    for mask in 0u32..(1 << cards.len()) {
        if mask.count_ones() != 5 {
            continue;
        }
        let mut five = [Card(0, super::entities::Suit::Hidden); 5];
        let mut i = 0;
        for (idx, card) in cards.iter().enumerate() {
            if mask & (1 << idx) != 0 {
                five[i] = *card;
                i += 1;
            }
        }
        let value = rank_five(&five);
        if best.as_ref().is_none_or(|b| value > *b) {
            best = Some(value);
        }
    }
    // The mask loop always visits at least one 5-subset.
    best.unwrap()
}

/// Indices of the hand(s) tied for strongest. Multiple indices mean a
/// split pot.
#[must_use]
pub fn best_indices(values: &[HandValue]) -> Vec<usize> {
    let Some(best) = values.iter().max() else {
        return Vec::new();
    };
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| *v == best)
        .map(|(i, _)| i)
        .collect()
}

fn rank_five(cards: &[Card; 5]) -> HandValue {
    let mut values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let straight_high = straight_high(&values);

    if let Some(high) = straight_high {
        let rank = if is_flush {
            HandRank::StraightFlush
        } else {
            HandRank::Straight
        };
        return HandValue {
            rank,
            tiebreak: vec![high],
        };
    }

    // Group values by multiplicity, most frequent then highest first.
    let mut groups: Vec<(usize, Value)> = Vec::new();
    for &v in &values {
        match groups.iter_mut().find(|(_, gv)| *gv == v) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, v)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let tiebreak: Vec<Value> = groups.iter().map(|(_, v)| *v).collect();
    let shape: Vec<usize> = groups.iter().map(|(count, _)| *count).collect();

    let rank = match shape.as_slice() {
        [4, 1] => HandRank::FourOfAKind,
        [3, 2] => HandRank::FullHouse,
        _ if is_flush => HandRank::Flush,
        [3, 1, 1] => HandRank::ThreeOfAKind,
        [2, 2, 1] => HandRank::TwoPair,
        [2, 1, 1, 1] => HandRank::OnePair,
        _ => HandRank::HighCard,
    };
    HandValue { rank, tiebreak }
}

/// High card of a straight formed by `values` (sorted descending), or
/// `None`. The wheel (A-2-3-4-5) counts with a high card of 5.
fn straight_high(values: &[Value]) -> Option<Value> {
    if values.windows(2).all(|w| w[0] == w[1] + 1) {
        return Some(values[0]);
    }
    if values == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}
