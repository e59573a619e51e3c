//! The concurrency layer around [`crate::game::Table`].
//!
//! Each table runs as an actor on its own tokio task: one
//! [`TableActor`] owns the table state and drains an mpsc inbox, so all
//! mutations are serialized without locks while independent tables
//! proceed in parallel. Clients hold a cheap cloneable [`TableHandle`]
//! and get replies over oneshot channels. Timeouts and hand transitions
//! arrive through the same inbox as everything else, stamped with the
//! table generation so stale timers are ignored.

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;
pub mod scheduler;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use messages::Transport;
pub use registry::TableRegistry;
