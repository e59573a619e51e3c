//! End-to-end tests of the actor layer: handles, timers, transport
//! fan-out, and the registry. Timings use short timers and generous
//! sleeps to stay stable on slow CI machines.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use holdem_engine::game::entities::{ConnectionId, Player};
use holdem_engine::game::{HandState, TableError};
use holdem_engine::table::messages::TableEvent;
use holdem_engine::table::{TableActor, TableConfig, TableRegistry, Transport};

/// Captures everything the actors try to deliver.
#[derive(Default)]
struct RecordingTransport {
    events: Mutex<Vec<(Option<ConnectionId>, TableEvent)>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        Arc::new(Self::default())
    }

    fn events(&self) -> Vec<(Option<ConnectionId>, TableEvent)> {
        self.events.lock().unwrap().clone()
    }

    fn snapshot_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|(_, event)| match event {
                TableEvent::TableSnapshot { message: Some(m), .. } => Some(m),
                _ => None,
            })
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, connection_id: &ConnectionId, event: &TableEvent) {
        self.events
            .lock()
            .unwrap()
            .push((Some(connection_id.clone()), event.clone()));
    }

    fn broadcast(&self, event: &TableEvent) {
        self.events.lock().unwrap().push((None, event.clone()));
    }
}

fn player(i: usize) -> Player {
    Player::new(&format!("conn-{i}"), &format!("p{i}"), &format!("player{i}"), 10_000)
}

fn conn(i: usize) -> ConnectionId {
    format!("conn-{i}")
}

fn config(turn_timeout_ms: u64, next_hand_delay_ms: u64) -> TableConfig {
    TableConfig {
        name: "Actor Test".to_string(),
        turn_timeout_ms,
        next_hand_delay_ms,
        ..Default::default()
    }
}

#[tokio::test]
async fn joining_players_are_auto_seated_and_a_hand_starts() {
    let transport = RecordingTransport::new();
    let (actor, handle) = TableActor::new(1, &config(60_000, 50), transport.clone());
    tokio::spawn(actor.run());

    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();

    // One player is not enough; the second join arms the hand timer.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let view = handle.snapshot(conn(1)).await.unwrap();
    assert_eq!(view.state, HandState::PreflopBetting);
    assert!(view.seats[&1].is_some());
    assert!(view.seats[&2].is_some());
    assert_eq!(view.seats[&1].as_ref().unwrap().hand.len(), 2);
    assert_eq!(view.pot, 15);

    // Every state change fanned out per-connection snapshots.
    let snapshots = transport
        .events()
        .iter()
        .filter(|(to, event)| {
            to.is_some() && matches!(event, TableEvent::TableSnapshot { .. })
        })
        .count();
    assert!(snapshots >= 4, "expected fan-out snapshots, saw {snapshots}");
}

#[tokio::test]
async fn actions_flow_through_the_handle_and_redact_per_viewer() {
    let transport = RecordingTransport::new();
    let (actor, handle) = TableActor::new(1, &config(60_000, 50), transport.clone());
    tokio::spawn(actor.run());

    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Heads-up: seat 2 is the small blind and acts first.
    assert_eq!(
        handle.check(conn(1)).await,
        Err(TableError::IllegalAction("not your turn".to_string()))
    );
    handle.call(conn(2)).await.unwrap();
    handle.check(conn(1)).await.unwrap();

    let view = handle.snapshot(conn(1)).await.unwrap();
    assert_eq!(view.state, HandState::FlopBetting);
    assert_eq!(view.board.len(), 3);

    // Each viewer sees their own cards and a redacted opponent.
    let own = view.seats[&1].as_ref().unwrap();
    let other = view.seats[&2].as_ref().unwrap();
    assert!(own.hand.iter().all(|c| c.0 != 0));
    assert!(other.hand.iter().all(|c| c.0 == 0));
}

#[tokio::test]
async fn idle_turns_are_force_folded() {
    let transport = RecordingTransport::new();
    let (actor, handle) = TableActor::new(1, &config(60, 50), transport.clone());
    tokio::spawn(actor.run());

    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();

    // Let the hand start and both 60ms turn clocks expire. Heads-up a
    // single timeout fold ends the hand immediately.
    tokio::time::sleep(Duration::from_millis(600)).await;

    let messages = transport.snapshot_messages();
    assert!(
        messages.iter().any(|m| m.ends_with("folds (time)")),
        "no timeout fold observed in {messages:?}"
    );
    assert!(
        messages.iter().any(|m| m.contains("wins $")),
        "no win message observed in {messages:?}"
    );
}

#[tokio::test]
async fn hands_keep_dealing_while_players_remain() {
    let transport = RecordingTransport::new();
    let (actor, handle) = TableActor::new(1, &config(40, 40), transport.clone());
    tokio::spawn(actor.run());

    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(900)).await;

    // Timeout folds end hands; the transition timer deals the next one.
    let wins = transport
        .snapshot_messages()
        .iter()
        .filter(|m| m.contains("wins $"))
        .count();
    assert!(wins >= 2, "expected repeated hands, saw {wins} wins");

    // Chips moved between the players but never off the table. The pot
    // figure already includes live bets.
    let view = handle.snapshot(conn(1)).await.unwrap();
    let chips: u32 = view.seats.values().flatten().map(|s| s.stack).sum::<u32>() + view.pot;
    assert_eq!(chips, 2_000);
}

#[tokio::test]
async fn leaving_mid_hand_awards_the_survivor() {
    let transport = RecordingTransport::new();
    let (actor, handle) = TableActor::new(1, &config(60_000, 40), transport.clone());
    tokio::spawn(actor.run());

    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    handle.leave(conn(2)).await.unwrap();
    let view = handle.snapshot(conn(1)).await.unwrap();
    assert!(view.win_messages.iter().any(|m| m.contains("player1 wins")));
    assert!(view.seats[&2].is_none());

    // Alone at the table, the next transition resets to waiting.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let view = handle.snapshot(conn(1)).await.unwrap();
    assert_eq!(view.state, HandState::WaitingForPlayers);
}

#[tokio::test]
async fn chat_lines_fan_out_with_the_sender_name() {
    let transport = RecordingTransport::new();
    let (actor, handle) = TableActor::new(1, &config(60_000, 60_000), transport.clone());
    tokio::spawn(actor.run());

    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();
    handle.chat(conn(1), "good luck".to_string()).await.unwrap();
    // Force a round trip so the fire-and-forget chat is processed.
    handle.snapshot(conn(1)).await.unwrap();

    let delivered = transport.events().into_iter().any(|(to, event)| {
        to.as_deref() == Some("conn-2")
            && matches!(
                &event,
                TableEvent::TableSnapshot { message: Some(m), from: Some(f), .. }
                    if m == "good luck" && f == "player1"
            )
    });
    assert!(delivered, "chat line never reached the other player");
}

#[tokio::test]
async fn registry_routes_lobby_traffic() {
    let transport = RecordingTransport::new();
    let registry = TableRegistry::new(transport.clone());

    let bad = TableConfig {
        min_bet: 7,
        ..Default::default()
    };
    assert!(registry.create_table(bad).await.is_err());

    let id = registry
        .create_table(config(60_000, 60_000))
        .await
        .unwrap();
    assert_eq!(registry.table_count().await, 1);

    registry.join_table(id, player(1)).await.unwrap();
    let summaries = registry.summaries().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, id);
    assert_eq!(summaries[0].current_number_players, 1);
    assert_eq!(summaries[0].big_blind, 10);
    assert_eq!(summaries[0].small_blind, 5);

    let joined = transport.events().into_iter().any(|(to, event)| {
        to.as_deref() == Some("conn-1")
            && matches!(event, TableEvent::TableJoined { table_id, .. } if table_id == id)
    });
    assert!(joined, "no tableJoined event for the joining connection");

    registry.leave_table(id, conn(1)).await.unwrap();
    let left = transport.events().into_iter().any(|(to, event)| {
        to.as_deref() == Some("conn-1")
            && matches!(event, TableEvent::TableLeft { table_id, .. } if table_id == id)
    });
    assert!(left, "no tableLeft event for the leaving connection");
    assert_eq!(registry.summaries().await[0].current_number_players, 0);

    assert_eq!(
        registry.join_table(99, player(1)).await,
        Err(TableError::NotFound)
    );

    registry.close_table(id).await.unwrap();
    assert_eq!(registry.table_count().await, 0);
    assert_eq!(registry.handle(id).await.err(), Some(TableError::NotFound));
}

#[tokio::test]
async fn disconnects_are_swept_from_every_table() {
    let transport = RecordingTransport::new();
    let registry = TableRegistry::new(transport.clone());

    let first = registry.create_table(config(60_000, 60_000)).await.unwrap();
    let second = registry.create_table(config(60_000, 60_000)).await.unwrap();
    registry.join_table(first, player(1)).await.unwrap();
    registry.join_table(second, player(1)).await.unwrap();
    registry.join_table(second, player(2)).await.unwrap();

    registry.remove_connection(&conn(1)).await;

    let summaries = registry.summaries().await;
    let by_id = |id| {
        summaries
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.current_number_players)
    };
    assert_eq!(by_id(first), Some(0));
    assert_eq!(by_id(second), Some(1));
}
