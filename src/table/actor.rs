//! One actor per table.
//!
//! The actor owns a [`Table`] and a [`TurnScheduler`] and processes its
//! inbox to completion, so every table mutation happens on one task.
//! Clients talk to it through a [`TableHandle`]; scheduled timers post
//! into the same inbox. Successful actions fan out fresh per-viewer
//! snapshots over the transport; failures are reported only to the
//! caller's reply channel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{Chips, ConnectionId, Player, SeatNumber, TableId};
use crate::game::view::{self, TableView};
use crate::game::{HandState, Table, TableError};

use super::config::TableConfig;
use super::messages::{TableEvent, TableMessage, TableSummary, TimerKind, Transport};
use super::scheduler::TurnScheduler;

const INBOX_CAPACITY: usize = 64;

pub struct TableActor {
    table: Table,
    inbox: mpsc::Receiver<TableMessage>,
    transport: Arc<dyn Transport>,
    scheduler: TurnScheduler,
    buy_in: Chips,
}

impl TableActor {
    /// Build an actor and the handle clients use to reach it. The actor
    /// does nothing until [`run`](Self::run) is spawned.
    #[must_use]
    pub fn new(
        id: TableId,
        config: &TableConfig,
        transport: Arc<dyn Transport>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let scheduler = TurnScheduler::new(sender.clone(), config);
        let table = Table::with_rules(id, &config.name, config.max_seats, config.min_bet, config.buy_in);
        let actor = Self {
            table,
            inbox,
            transport,
            scheduler,
            buy_in: config.buy_in,
        };
        (actor, TableHandle { sender })
    }

    /// Drain the inbox until every handle is dropped or a `Close`
    /// message arrives.
    pub async fn run(mut self) {
        log::info!("table {}: actor started", self.table.id());
        while let Some(message) = self.inbox.recv().await {
            if self.handle_message(message) {
                break;
            }
        }
        self.scheduler.cancel_all();
        log::info!("table {}: actor stopped", self.table.id());
    }

    /// Process one message. Returns `true` when the actor should stop.
    fn handle_message(&mut self, message: TableMessage) -> bool {
        match message {
            TableMessage::Join { player, reply } => {
                self.join(player);
                let _ = reply.send(Ok(()));
            }
            TableMessage::Leave { connection_id, reply } => {
                let result = self.table.leave(&connection_id);
                let _ = reply.send(result.clone());
                if result.is_ok() {
                    self.after_table_change(None, None);
                }
            }
            TableMessage::SitDown { connection_id, seat_number, buy_in, reply } => {
                let result = self.table.sit_down(&connection_id, seat_number, buy_in);
                let _ = reply.send(result.clone());
                if result.is_ok() {
                    self.after_table_change(None, None);
                }
            }
            TableMessage::StandUp { connection_id, reply } => {
                let result = self.table.stand_up(&connection_id);
                let _ = reply.send(result.clone());
                if result.is_ok() {
                    self.after_table_change(None, None);
                }
            }
            TableMessage::Rebuy { connection_id, amount, reply } => {
                let result = self.table.rebuy(&connection_id, amount);
                let _ = reply.send(result.clone());
                if result.is_ok() {
                    self.after_table_change(None, None);
                }
            }
            TableMessage::SitOut { connection_id, reply } => {
                let result = self.table.sit_out(&connection_id);
                let _ = reply.send(result.clone());
                if result.is_ok() {
                    self.after_table_change(None, None);
                }
            }
            TableMessage::SitIn { connection_id, reply } => {
                let result = self.table.sit_in(&connection_id);
                let _ = reply.send(result.clone());
                if result.is_ok() {
                    self.after_table_change(None, None);
                }
            }
            TableMessage::Fold { connection_id, reply } => {
                self.seat_action(reply, |table| table.fold(&connection_id));
            }
            TableMessage::Check { connection_id, reply } => {
                self.seat_action(reply, |table| table.check(&connection_id));
            }
            TableMessage::Call { connection_id, reply } => {
                self.seat_action(reply, |table| table.call(&connection_id));
            }
            TableMessage::Raise { connection_id, amount, reply } => {
                self.seat_action(reply, |table| table.raise(&connection_id, amount));
            }
            TableMessage::Chat { connection_id, text } => {
                self.chat(&connection_id, text);
            }
            TableMessage::GetSnapshot { connection_id, reply } => {
                let _ = reply.send(view::project(&self.table, &connection_id));
            }
            TableMessage::Summary { reply } => {
                let _ = reply.send(self.summary());
            }
            TableMessage::TimerFired { generation, kind } => {
                self.timer_fired(generation, kind);
            }
            TableMessage::Close => return true,
        }
        false
    }

    /// Register the player and seat them at the first open seat with the
    /// table's standard buy-in. A full table or a thin bankroll leaves
    /// them joined as a spectator.
    fn join(&mut self, player: Player) {
        let connection_id = player.connection_id.clone();
        self.table.join(player);
        if self.table.seat_by_connection(&connection_id).is_none() {
            match self.table.first_open_seat() {
                Some(seat_number) => {
                    if let Err(err) = self.table.sit_down(&connection_id, seat_number, self.buy_in) {
                        log::warn!(
                            "table {}: could not auto-seat {connection_id}: {err}",
                            self.table.id()
                        );
                    }
                }
                None => log::debug!("table {}: full, {connection_id} spectates", self.table.id()),
            }
        }
        self.after_table_change(None, None);
    }

    fn seat_action(
        &mut self,
        reply: oneshot::Sender<Result<(), TableError>>,
        action: impl FnOnce(&mut Table) -> Result<String, TableError>,
    ) {
        match action(&mut self.table) {
            Ok(message) => {
                let _ = reply.send(Ok(()));
                self.after_table_change(Some(message), None);
            }
            Err(err) => {
                let _ = reply.send(Err(err));
            }
        }
    }

    fn chat(&mut self, connection_id: &ConnectionId, text: String) {
        let Some(player) = self.table.player_by_connection(connection_id) else {
            log::warn!("table {}: chat from unknown connection", self.table.id());
            return;
        };
        let from = player.name.clone();
        self.broadcast_snapshots(Some(text), Some(from));
    }

    fn timer_fired(&mut self, generation: u64, kind: TimerKind) {
        if generation != self.table.generation() {
            log::debug!(
                "table {}: stale timer (gen {generation}, table at {})",
                self.table.id(),
                self.table.generation()
            );
            return;
        }
        match kind {
            TimerKind::TurnTimeout { seat } => {
                if let Some(message) = self.table.force_fold(seat) {
                    self.after_table_change(Some(message), None);
                }
            }
            TimerKind::HandTransition => {
                if self.table.start_hand() {
                    self.after_table_change(None, None);
                } else {
                    self.table.reset_to_waiting();
                    self.after_table_change(Some("Waiting for more players".to_string()), None);
                }
            }
        }
    }

    /// Re-sync timers with the table state and push fresh snapshots.
    fn after_table_change(&mut self, message: Option<String>, from: Option<String>) {
        let generation = self.table.generation();
        match self.table.state() {
            state if state.is_betting() => {
                match self.table.turn() {
                    Some(seat) => self.scheduler.arm_turn(seat, generation),
                    None => self.scheduler.cancel_turn(),
                }
            }
            HandState::HandComplete => {
                self.scheduler.cancel_turn();
                self.scheduler.schedule_transition(generation);
            }
            HandState::WaitingForPlayers => {
                self.scheduler.cancel_turn();
                if self.table.can_start_hand() {
                    self.scheduler.schedule_transition(generation);
                } else {
                    self.scheduler.cancel_transition();
                }
            }
            _ => {}
        }
        self.broadcast_snapshots(message, from);
    }

    /// Send each joined connection its own redacted snapshot.
    fn broadcast_snapshots(&self, message: Option<String>, from: Option<String>) {
        for player in self.table.players() {
            let event = TableEvent::TableSnapshot {
                table: view::project(&self.table, &player.connection_id),
                message: message.clone(),
                from: from.clone(),
            };
            self.transport.send(&player.connection_id, &event);
        }
    }

    fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.table.id(),
            name: self.table.name().to_string(),
            limit: self.table.buy_in(),
            max_players: self.table.max_seats(),
            current_number_players: self.table.seated_count(),
            small_blind: self.table.min_bet() / 2,
            big_blind: self.table.min_bet(),
        }
    }
}

/// Client-side handle to a running [`TableActor`].
///
/// Cloning is cheap; all clones feed the same inbox. Every method
/// resolves once the actor has processed the request. A dropped actor
/// surfaces as [`TableError::NotFound`].
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
}

impl TableHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, TableError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| TableError::NotFound)?;
        response.await.map_err(|_| TableError::NotFound)
    }

    pub async fn join(&self, player: Player) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Join { player, reply }).await?
    }

    pub async fn leave(&self, connection_id: ConnectionId) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Leave { connection_id, reply }).await?
    }

    pub async fn sit_down(
        &self,
        connection_id: ConnectionId,
        seat_number: SeatNumber,
        buy_in: Chips,
    ) -> Result<(), TableError> {
        self.request(|reply| TableMessage::SitDown { connection_id, seat_number, buy_in, reply })
            .await?
    }

    pub async fn stand_up(&self, connection_id: ConnectionId) -> Result<Chips, TableError> {
        self.request(|reply| TableMessage::StandUp { connection_id, reply }).await?
    }

    pub async fn rebuy(&self, connection_id: ConnectionId, amount: Chips) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Rebuy { connection_id, amount, reply }).await?
    }

    pub async fn sit_out(&self, connection_id: ConnectionId) -> Result<(), TableError> {
        self.request(|reply| TableMessage::SitOut { connection_id, reply }).await?
    }

    pub async fn sit_in(&self, connection_id: ConnectionId) -> Result<(), TableError> {
        self.request(|reply| TableMessage::SitIn { connection_id, reply }).await?
    }

    pub async fn fold(&self, connection_id: ConnectionId) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Fold { connection_id, reply }).await?
    }

    pub async fn check(&self, connection_id: ConnectionId) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Check { connection_id, reply }).await?
    }

    pub async fn call(&self, connection_id: ConnectionId) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Call { connection_id, reply }).await?
    }

    pub async fn raise(&self, connection_id: ConnectionId, amount: Chips) -> Result<(), TableError> {
        self.request(|reply| TableMessage::Raise { connection_id, amount, reply }).await?
    }

    /// Relay a chat line to everyone at the table.
    pub async fn chat(&self, connection_id: ConnectionId, text: String) -> Result<(), TableError> {
        self.sender
            .send(TableMessage::Chat { connection_id, text })
            .await
            .map_err(|_| TableError::NotFound)
    }

    /// Fetch the table as `connection_id` is allowed to see it.
    pub async fn snapshot(&self, connection_id: ConnectionId) -> Result<TableView, TableError> {
        self.request(|reply| TableMessage::GetSnapshot { connection_id, reply }).await
    }

    pub async fn summary(&self) -> Result<TableSummary, TableError> {
        self.request(|reply| TableMessage::Summary { reply }).await
    }

    /// Ask the actor to shut down. Outstanding timers are dropped.
    pub async fn close(&self) -> Result<(), TableError> {
        self.sender
            .send(TableMessage::Close)
            .await
            .map_err(|_| TableError::NotFound)
    }
}
