//! Cancelable timers feeding back into a table actor's inbox.
//!
//! The scheduler never touches table state itself. It spawns a sleep
//! task per armed timer; when the sleep elapses the task posts a
//! [`TableMessage::TimerFired`] stamped with the generation it was armed
//! under, and the actor discards it if the table has moved on. Aborting
//! the task cancels the timer outright, so the common case (a player
//! acts in time) costs one task abort and no inbox traffic.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::game::entities::SeatNumber;

use super::config::TableConfig;
use super::messages::{TableMessage, TimerKind};

pub struct TurnScheduler {
    sender: mpsc::Sender<TableMessage>,
    turn_timeout: Duration,
    next_hand_delay: Duration,
    turn_timer: Option<JoinHandle<()>>,
    transition_timer: Option<JoinHandle<()>>,
}

impl TurnScheduler {
    #[must_use]
    pub fn new(sender: mpsc::Sender<TableMessage>, config: &TableConfig) -> Self {
        Self {
            sender,
            turn_timeout: Duration::from_millis(config.turn_timeout_ms),
            next_hand_delay: Duration::from_millis(config.next_hand_delay_ms),
            turn_timer: None,
            transition_timer: None,
        }
    }

    /// Give `seat` the action clock. Replaces any previous turn timer.
    pub fn arm_turn(&mut self, seat: SeatNumber, generation: u64) {
        self.cancel_turn();
        self.turn_timer = Some(self.spawn(
            self.turn_timeout,
            generation,
            TimerKind::TurnTimeout { seat },
        ));
    }

    pub fn cancel_turn(&mut self) {
        if let Some(timer) = self.turn_timer.take() {
            timer.abort();
        }
    }

    /// Schedule the between-hands transition (next deal or idle reset).
    pub fn schedule_transition(&mut self, generation: u64) {
        self.cancel_transition();
        self.transition_timer =
            Some(self.spawn(self.next_hand_delay, generation, TimerKind::HandTransition));
    }

    pub fn cancel_transition(&mut self) {
        if let Some(timer) = self.transition_timer.take() {
            timer.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_turn();
        self.cancel_transition();
    }

    fn spawn(&self, delay: Duration, generation: u64, kind: TimerKind) -> JoinHandle<()> {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The actor may already be gone; a closed inbox is fine.
            let _ = sender.send(TableMessage::TimerFired { generation, kind }).await;
        })
    }
}

impl Drop for TurnScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(turn_ms: u64, delay_ms: u64) -> TableConfig {
        TableConfig {
            turn_timeout_ms: turn_ms,
            next_hand_delay_ms: delay_ms,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fired_turn_timer_posts_to_the_inbox() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TurnScheduler::new(tx, &config(10, 1_000));
        scheduler.arm_turn(3, 7);
        match rx.recv().await {
            Some(TableMessage::TimerFired { generation, kind }) => {
                assert_eq!(generation, 7);
                assert_eq!(kind, TimerKind::TurnTimeout { seat: 3 });
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn canceled_timers_never_fire() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TurnScheduler::new(tx, &config(20, 20));
        scheduler.arm_turn(1, 1);
        scheduler.schedule_transition(1);
        scheduler.cancel_all();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rearming_replaces_the_previous_timer() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TurnScheduler::new(tx, &config(30, 1_000));
        scheduler.arm_turn(1, 1);
        scheduler.arm_turn(2, 2);
        let first = rx.recv().await;
        match first {
            Some(TableMessage::TimerFired { generation, kind }) => {
                assert_eq!(generation, 2);
                assert_eq!(kind, TimerKind::TurnTimeout { seat: 2 });
            }
            other => panic!("unexpected message: {other:?}"),
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err(), "replaced timer fired anyway");
    }
}
