//! Property tests for pot layering and table-level chip conservation.

use proptest::prelude::*;

use holdem_engine::game::entities::{Chips, ConnectionId, Player};
use holdem_engine::game::pot::PotLedger;
use holdem_engine::game::{HandState, Table};

fn conn(i: usize) -> ConnectionId {
    format!("conn-{i}")
}

/// (seat, amount, folded, all_in) sweep entries. Seat 1 is forced to
/// stay live so at least one contender exists, as in any real hand.
fn ledger_entries() -> impl Strategy<Value = Vec<(usize, Chips, bool, bool)>> {
    let live = (Just(1usize), 1u32..400, Just(false), any::<bool>());
    let rest = (2usize..=9, 1u32..400, any::<bool>(), any::<bool>());
    (live, prop::collection::vec(rest, 0..30))
        .prop_map(|(first, mut rest)| {
            rest.insert(0, first);
            rest
        })
}

proptest! {
    #[test]
    fn pot_layers_sum_to_the_ledger_total(entries in ledger_entries()) {
        let mut ledger = PotLedger::new();
        for (seat, amount, folded, all_in) in entries {
            ledger.collect(seat, amount, folded, all_in);
        }
        let pots = ledger.pots();
        let layered: Chips = pots.iter().map(|p| p.amount).sum();
        prop_assert_eq!(layered, ledger.total());
    }

    #[test]
    fn eligibility_shrinks_and_never_includes_folds(entries in ledger_entries()) {
        let mut ledger = PotLedger::new();
        let mut folded_seats = std::collections::BTreeSet::new();
        for (seat, amount, folded, all_in) in entries {
            ledger.collect(seat, amount, folded, all_in);
            if folded {
                folded_seats.insert(seat);
            }
        }
        let pots = ledger.pots();
        for pot in &pots {
            prop_assert!(pot.amount > 0);
            prop_assert!(!pot.eligible.is_empty());
            prop_assert!(pot.eligible.is_disjoint(&folded_seats));
        }
        for pair in pots.windows(2) {
            prop_assert!(pair[1].eligible.is_subset(&pair[0].eligible));
            prop_assert!(pair[1].eligible != pair[0].eligible);
        }
    }

    /// Random action scripts against a live table never create or
    /// destroy chips, and every hand terminates.
    #[test]
    fn random_hands_conserve_chips(
        buy_ins in prop::collection::vec(20u32..2_000, 2..5),
        script in prop::collection::vec(0u8..4, 0..60),
    ) {
        let mut table = Table::new(1, "Prop", 1_000);
        let mut total = 0;
        for (i, buy_in) in buy_ins.iter().enumerate() {
            let i = i + 1;
            table.join(Player::new(&conn(i), &format!("p{i}"), &format!("player{i}"), 10_000));
            table.sit_down(&conn(i), i, *buy_in).unwrap();
            total += buy_in;
        }
        prop_assert!(table.start_hand());
        prop_assert_eq!(table.chips_in_play(), total);

        for step in script {
            if !table.state().is_betting() {
                break;
            }
            let turn = table.turn().unwrap();
            let seat = table.seat(turn).unwrap();
            let connection = seat.player.connection_id.clone();
            let owes = seat.current_bet < table.call_amount();
            match step {
                0 => {
                    table.fold(&connection).unwrap();
                }
                1 if owes => {
                    table.call(&connection).unwrap();
                }
                1 => {
                    table.check(&connection).unwrap();
                }
                2 => {
                    // Minimum raise when affordable, otherwise a call.
                    let target = table.min_raise();
                    if target > seat.current_bet && target - seat.current_bet <= seat.stack {
                        table.raise(&connection, target).unwrap();
                    } else {
                        table.call(&connection).unwrap();
                    }
                }
                _ => {
                    // Shove when it is a legal raise, otherwise call.
                    let shove = seat.stack + seat.current_bet;
                    if shove >= table.min_raise() {
                        table.raise(&connection, shove).unwrap();
                    } else {
                        table.call(&connection).unwrap();
                    }
                }
            }
            prop_assert_eq!(table.chips_in_play(), total);
            // At most one seat ever holds the turn.
            prop_assert!(table.seats().filter(|s| s.turn).count() <= 1);
        }

        // Passively finish whatever the script left open.
        let mut guard = 0;
        while table.state().is_betting() {
            guard += 1;
            prop_assert!(guard < 200);
            let turn = table.turn().unwrap();
            let seat = table.seat(turn).unwrap();
            let connection = seat.player.connection_id.clone();
            if seat.current_bet < table.call_amount() {
                table.call(&connection).unwrap();
            } else {
                table.check(&connection).unwrap();
            }
        }
        prop_assert_eq!(table.state(), HandState::HandComplete);
        prop_assert_eq!(table.chips_in_play(), total);
        prop_assert!(!table.win_messages().is_empty());
    }
}
