//! # Board Event System
//!
//! Notifications a rendering layer subscribes to. The interaction surface
//! never computes bucket or tree membership itself; these three events are
//! the whole contract between the sync engine and its consumers.

pub mod publisher;

pub use publisher::{EventPublisher, PublishedEvent};

use serde::{Deserialize, Serialize};

/// Lifecycle notifications emitted by the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A move was requested and applied optimistically.
    MoveIntent {
        item_id: String,
        from_bucket: String,
        to_bucket: String,
    },
    /// The remote store confirmed the move.
    SettleSuccess { item_id: String, bucket: String },
    /// The remote store denied the move; the snapshot was rolled back.
    SettleFailure {
        item_id: String,
        bucket: String,
        reason: String,
    },
}

impl BoardEvent {
    /// The item this event concerns.
    pub fn item_id(&self) -> &str {
        match self {
            BoardEvent::MoveIntent { item_id, .. }
            | BoardEvent::SettleSuccess { item_id, .. }
            | BoardEvent::SettleFailure { item_id, .. } => item_id,
        }
    }
}
