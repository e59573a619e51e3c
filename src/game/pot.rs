//! Pot accounting with all-in side pots.
//!
//! The table sweeps each seat's round wager into a [`PotLedger`] when a
//! betting round settles. The ledger records cumulative contributions per
//! seat plus fold and all-in markers, and derives the pot layering on
//! demand: each distinct all-in contribution total caps a layer, and only
//! seats that contributed at least a layer's cap (and have not folded)
//! are eligible to win it. Folded chips stay in the pots they reached but
//! never confer eligibility.

use std::collections::{BTreeMap, BTreeSet};

use super::entities::{Chips, SeatNumber};

/// One pot layer: an amount and the seats eligible to win it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: BTreeSet<SeatNumber>,
}

/// Cumulative per-hand contribution bookkeeping for one table.
#[derive(Clone, Debug, Default)]
pub struct PotLedger {
    contributions: BTreeMap<SeatNumber, Chips>,
    folded: BTreeSet<SeatNumber>,
    // Cumulative contribution total at the moment each seat went all-in.
    all_in_caps: BTreeMap<SeatNumber, Chips>,
}

impl PotLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` swept from a seat at round settlement. `folded`
    /// and `all_in` reflect the seat's status at that moment.
    pub fn collect(&mut self, seat: SeatNumber, amount: Chips, folded: bool, all_in: bool) {
        let total = self.contributions.entry(seat).or_insert(0);
        *total += amount;
        if folded {
            self.folded.insert(seat);
        }
        if all_in {
            self.all_in_caps.insert(seat, *total);
        }
    }

    /// Mark a seat folded after its chips were already collected (a seat
    /// abandoned mid-hand).
    pub fn mark_folded(&mut self, seat: SeatNumber) {
        self.folded.insert(seat);
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.contributions.values().sum()
    }

    #[must_use]
    pub fn contribution(&self, seat: SeatNumber) -> Chips {
        self.contributions.get(&seat).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.contributions.clear();
        self.folded.clear();
        self.all_in_caps.clear();
    }

    /// Derive the pot layers, main pot first.
    ///
    /// Layer boundaries are the distinct all-in contribution totals of
    /// seats still in the hand, topped by the largest live contribution.
    /// Folded chips above that (uncalled dead money) roll into the top
    /// pot, so the layer amounts always sum to [`total`](Self::total).
    /// With every contributor folded there is nothing to award and the
    /// result is empty.
    #[must_use]
    pub fn pots(&self) -> Vec<Pot> {
        let max_live = self
            .contributions
            .iter()
            .filter(|(seat, _)| !self.folded.contains(*seat))
            .map(|(_, c)| *c)
            .max()
            .unwrap_or(0);
        if max_live == 0 {
            return Vec::new();
        }
        let mut levels: Vec<Chips> = self
            .all_in_caps
            .iter()
            .filter(|(seat, _)| !self.folded.contains(*seat))
            .map(|(_, cap)| *cap)
            .collect();
        levels.push(max_live);
        levels.sort_unstable();
        levels.dedup();

        let mut pots: Vec<Pot> = Vec::new();
        let mut prev = 0;
        for level in levels {
            let amount: Chips = self
                .contributions
                .values()
                .map(|&c| c.min(level) - c.min(prev))
                .sum();
            prev = level;
            if amount == 0 {
                continue;
            }
            // Every layer up to max_live keeps at least one live seat
            // eligible, so this set is never empty.
            let eligible: BTreeSet<SeatNumber> = self
                .contributions
                .iter()
                .filter(|&(seat, &c)| c >= level && !self.folded.contains(seat))
                .map(|(seat, _)| *seat)
                .collect();
            match pots.last_mut() {
                Some(last) if last.eligible == eligible => last.amount += amount,
                _ => pots.push(Pot { amount, eligible }),
            }
        }
        let dead: Chips = self.contributions.values().map(|&c| c - c.min(prev)).sum();
        if dead > 0 {
            if let Some(last) = pots.last_mut() {
                last.amount += dead;
            }
        }
        pots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible(seats: &[SeatNumber]) -> BTreeSet<SeatNumber> {
        seats.iter().copied().collect()
    }

    #[test]
    fn single_pot_when_nobody_is_all_in() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 50, false, false);
        ledger.collect(2, 50, false, false);
        ledger.collect(3, 50, false, false);
        assert_eq!(
            ledger.pots(),
            vec![Pot {
                amount: 150,
                eligible: eligible(&[1, 2, 3]),
            }]
        );
        assert_eq!(ledger.total(), 150);
    }

    #[test]
    fn short_all_in_caps_the_main_pot() {
        // A all-in for 100; B and C continue to 300 each.
        let mut ledger = PotLedger::new();
        ledger.collect(1, 100, false, true);
        ledger.collect(2, 300, false, false);
        ledger.collect(3, 300, false, false);
        assert_eq!(
            ledger.pots(),
            vec![
                Pot {
                    amount: 300,
                    eligible: eligible(&[1, 2, 3]),
                },
                Pot {
                    amount: 400,
                    eligible: eligible(&[2, 3]),
                },
            ]
        );
    }

    #[test]
    fn two_all_ins_layer_three_pots() {
        // Contributions 25 (all-in), 75 (all-in), 150, 150.
        let mut ledger = PotLedger::new();
        ledger.collect(1, 25, false, true);
        ledger.collect(2, 75, false, true);
        ledger.collect(3, 150, false, false);
        ledger.collect(4, 150, false, false);
        assert_eq!(
            ledger.pots(),
            vec![
                Pot {
                    amount: 100,
                    eligible: eligible(&[1, 2, 3, 4]),
                },
                Pot {
                    amount: 150,
                    eligible: eligible(&[2, 3, 4]),
                },
                Pot {
                    amount: 150,
                    eligible: eligible(&[3, 4]),
                },
            ]
        );
        assert_eq!(ledger.total(), 400);
    }

    #[test]
    fn folded_chips_stay_in_the_pot_without_eligibility() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 100, false, true);
        ledger.collect(2, 300, false, false);
        ledger.collect(3, 200, true, false);
        let pots = ledger.pots();
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, eligible(&[1, 2]));
        // B's uncalled 100 plus C's folded 100 above the cap.
        assert_eq!(pots[1].amount, 300);
        assert_eq!(pots[1].eligible, eligible(&[2]));
        assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), ledger.total());
    }

    #[test]
    fn folded_all_in_does_not_cap_a_layer() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 40, true, true);
        ledger.collect(2, 100, false, false);
        ledger.collect(3, 100, false, false);
        assert_eq!(
            ledger.pots(),
            vec![Pot {
                amount: 240,
                eligible: eligible(&[2, 3]),
            }]
        );
    }

    #[test]
    fn contributions_accumulate_across_rounds() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 10, false, false);
        ledger.collect(2, 10, false, false);
        ledger.collect(1, 30, false, true);
        ledger.collect(2, 50, false, false);
        assert_eq!(ledger.contribution(1), 40);
        assert_eq!(ledger.contribution(2), 60);
        assert_eq!(
            ledger.pots(),
            vec![
                Pot {
                    amount: 80,
                    eligible: eligible(&[1, 2]),
                },
                Pot {
                    amount: 20,
                    eligible: eligible(&[2]),
                },
            ]
        );
    }

    #[test]
    fn mark_folded_removes_eligibility_retroactively() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 50, false, false);
        ledger.collect(2, 50, false, false);
        ledger.mark_folded(1);
        assert_eq!(
            ledger.pots(),
            vec![Pot {
                amount: 100,
                eligible: eligible(&[2]),
            }]
        );
    }

    #[test]
    fn dead_money_above_the_live_maximum_rolls_into_the_top_pot() {
        // The big stack folded after contributing far more than the only
        // live seat; everything goes to one pot only that seat can win.
        let mut ledger = PotLedger::new();
        ledger.collect(1, 100, false, false);
        ledger.collect(2, 500, true, false);
        assert_eq!(
            ledger.pots(),
            vec![Pot {
                amount: 600,
                eligible: eligible(&[1]),
            }]
        );
    }

    #[test]
    fn everyone_folded_leaves_nothing_to_award() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 50, true, false);
        ledger.collect(2, 80, true, true);
        assert!(ledger.pots().is_empty());
        assert_eq!(ledger.total(), 130);
    }

    #[test]
    fn clear_resets_everything() {
        let mut ledger = PotLedger::new();
        ledger.collect(1, 50, true, true);
        ledger.clear();
        assert_eq!(ledger.total(), 0);
        assert!(ledger.pots().is_empty());
    }

    #[test]
    fn empty_ledger_has_no_pots() {
        assert!(PotLedger::new().pots().is_empty());
    }
}
