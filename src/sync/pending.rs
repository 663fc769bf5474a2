//! Per-item move state and the pending-move ledger record.

use crate::board::BoardSnapshot;
use serde::{Deserialize, Serialize};

/// Observable move state of one item.
///
/// `Settled(bucket)` transitions to `Pending(from, to)` on a move request,
/// then back to `Settled(to)` on confirmation or `Settled(from)` on
/// rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MoveState {
    /// No confirm request outstanding.
    Settled { bucket: String },
    /// An optimistic move awaits its confirmation.
    Pending { from: String, to: String },
}

impl MoveState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

/// Ledger record held between the optimistic apply and the store's
/// confirm/deny.
///
/// At most one exists per item id. A second move request for the same item
/// supersedes the first: it keeps the ORIGINAL `from_bucket` and
/// `snapshot_before` for rollback and bumps `token`, so only the latest
/// request's resolution is acted upon.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub item_id: String,
    pub from_bucket: String,
    pub to_bucket: String,
    pub snapshot_before: BoardSnapshot,
    pub(crate) token: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_state_predicates() {
        let settled = MoveState::Settled {
            bucket: "Open".to_string(),
        };
        let pending = MoveState::Pending {
            from: "Open".to_string(),
            to: "Done".to_string(),
        };

        assert!(settled.is_settled());
        assert!(!settled.is_pending());
        assert!(pending.is_pending());
        assert!(!pending.is_settled());
    }

    #[test]
    fn test_move_state_serde() {
        let pending = MoveState::Pending {
            from: "Open".to_string(),
            to: "Done".to_string(),
        };
        let json = serde_json::to_string(&pending).unwrap();
        let parsed: MoveState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pending);
    }
}
