//! # Move Synchronization
//!
//! The optimistic-update/rollback protocol for bucket moves.
//!
//! A move request mutates the in-memory snapshot synchronously, records a
//! [`PendingMove`], and dispatches an asynchronous confirm request to the
//! record store. Confirmations may resolve in any order; a per-item
//! supersession token is the only ordering safety net. A denied confirmation
//! rolls the snapshot back and re-fetches authoritative state.

pub mod engine;
pub mod pending;

pub use engine::{MoveOutcome, SyncEngine};
pub use pending::{MoveState, PendingMove};

use crate::records::StoreError;
use thiserror::Error;

/// Errors surfaced by the sync engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("Unknown bucket: {bucket}")]
    UnknownBucket { bucket: String },

    #[error("Unknown item: {item_id}")]
    UnknownItem { item_id: String },

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}
