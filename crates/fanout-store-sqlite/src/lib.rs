//! SQLite backend for the Fanout session store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Saves are whole-collection
//! snapshots applied in one transaction, matching the session's explicit
//! commit boundaries.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteSessionStore;
