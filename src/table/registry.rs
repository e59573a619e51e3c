//! The set of live tables.
//!
//! The registry hands out table ids, spawns one actor task per table,
//! and keeps the id-to-handle map. It also owns the lobby traffic:
//! joining or leaving a table notifies the affected connection and
//! refreshes everyone's table list.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::game::TableError;
use crate::game::entities::{ConnectionId, Player, TableId};

use super::actor::{TableActor, TableHandle};
use super::config::TableConfig;
use super::messages::{TableEvent, TableSummary, Transport};

pub struct TableRegistry {
    transport: Arc<dyn Transport>,
    inner: RwLock<Inner>,
}

struct Inner {
    tables: HashMap<TableId, TableHandle>,
    next_id: TableId,
}

impl TableRegistry {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            inner: RwLock::new(Inner {
                tables: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Validate the config, spawn the table's actor, and register it.
    pub async fn create_table(&self, config: TableConfig) -> Result<TableId, TableError> {
        config.validate()?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let (actor, handle) = TableActor::new(id, &config, Arc::clone(&self.transport));
        tokio::spawn(actor.run());
        inner.tables.insert(id, handle);
        log::info!("created table {id} ({})", config.name);
        drop(inner);
        self.broadcast_lobby().await;
        Ok(id)
    }

    pub async fn handle(&self, id: TableId) -> Result<TableHandle, TableError> {
        self.inner
            .read()
            .await
            .tables
            .get(&id)
            .cloned()
            .ok_or(TableError::NotFound)
    }

    /// Lobby summaries for every live table.
    pub async fn summaries(&self) -> Vec<TableSummary> {
        let handles: Vec<(TableId, TableHandle)> = {
            let inner = self.inner.read().await;
            inner.tables.iter().map(|(id, h)| (*id, h.clone())).collect()
        };
        let mut summaries = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            match handle.summary().await {
                Ok(summary) => summaries.push(summary),
                Err(err) => log::warn!("table {id} did not answer a summary request: {err}"),
            }
        }
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    /// Join `player` to table `id` and sync the lobby.
    pub async fn join_table(&self, id: TableId, player: Player) -> Result<(), TableError> {
        let connection_id = player.connection_id.clone();
        let handle = self.handle(id).await?;
        handle.join(player).await?;
        let tables = self.summaries().await;
        self.transport.send(
            &connection_id,
            &TableEvent::TableJoined { table_id: id, tables },
        );
        self.broadcast_lobby().await;
        Ok(())
    }

    /// Remove a connection from table `id` and sync the lobby.
    pub async fn leave_table(&self, id: TableId, connection_id: ConnectionId) -> Result<(), TableError> {
        let handle = self.handle(id).await?;
        handle.leave(connection_id.clone()).await?;
        let tables = self.summaries().await;
        self.transport
            .send(&connection_id, &TableEvent::TableLeft { table_id: id, tables });
        self.broadcast_lobby().await;
        Ok(())
    }

    /// Drop a disconnected client from every table it joined.
    pub async fn remove_connection(&self, connection_id: &ConnectionId) {
        let handles: Vec<TableHandle> = {
            let inner = self.inner.read().await;
            inner.tables.values().cloned().collect()
        };
        let mut removed = false;
        for handle in handles {
            match handle.leave(connection_id.clone()).await {
                Ok(()) => removed = true,
                Err(TableError::NotFound) => {}
                Err(err) => log::warn!("removing {connection_id}: {err}"),
            }
        }
        if removed {
            self.broadcast_lobby().await;
        }
    }

    /// Shut a table down and forget it.
    pub async fn close_table(&self, id: TableId) -> Result<(), TableError> {
        let handle = {
            let mut inner = self.inner.write().await;
            inner.tables.remove(&id).ok_or(TableError::NotFound)?
        };
        handle.close().await?;
        self.broadcast_lobby().await;
        Ok(())
    }

    pub async fn table_count(&self) -> usize {
        self.inner.read().await.tables.len()
    }

    async fn broadcast_lobby(&self) {
        let tables = self.summaries().await;
        self.transport.broadcast(&TableEvent::TablesUpdated { tables });
    }
}
