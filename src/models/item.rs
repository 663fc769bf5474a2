//! # Work Item Model
//!
//! The validated item flowing through tree assembly, bucket classification,
//! and move synchronization.
//!
//! ## Overview
//!
//! A `WorkItem` is created fresh on every record-store fetch; no identity
//! persists across fetches except the `id`. Derived structures (forests,
//! groups, bucket snapshots) are rebuilt from the latest item set rather than
//! patched, with the single exception of the optimistic snapshot mutation
//! applied by the sync engine between fetches.
//!
//! ## Nested-set intervals
//!
//! Alongside `parent_id`, each item may carry a pair of integers implementing
//! a nested-set containment test: item A is a descendant of item B iff
//! `A.low > B.low && A.high < B.high`. Consumers use this for "all descendants
//! of X" queries without re-walking the tree; for non-orphaned items it must
//! agree with the `parent_id`-derived hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nested-set interval bounds (`low < high` always holds after validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalBounds {
    pub low: i64,
    pub high: i64,
}

impl IntervalBounds {
    /// Build bounds, rejecting degenerate pairs.
    pub fn new(low: i64, high: i64) -> Option<Self> {
        (low < high).then_some(Self { low, high })
    }

    /// Numeric containment test: `self` strictly inside `other`.
    pub fn is_inside(&self, other: &IntervalBounds) -> bool {
        self.low > other.low && self.high < other.high
    }
}

/// A validated work item before tree assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique, server-assigned identifier.
    pub id: String,
    /// Human-readable label (falls back to `id` when the record lacked one).
    pub label: String,
    /// Reference to another item's `id`; dangling references are promoted to
    /// roots during tree assembly, never dropped.
    pub parent_id: Option<String>,
    /// Container items may hold children and carry no progress of their own.
    pub is_container: bool,
    /// Current classification value (e.g. a lifecycle state).
    pub bucket_key: String,
    /// Owning-group key (e.g. a project id).
    pub group_key: Option<String>,
    /// Display title for the owning group, when fetched alongside the record.
    pub group_title: Option<String>,
    /// Modification timestamp used for deterministic ordering by callers.
    pub order_hint: Option<DateTime<Utc>>,
    /// Nested-set bounds, when the backend maintains them.
    pub interval: Option<IntervalBounds>,
    /// Assigned user identifiers; order is not meaningful.
    pub assignees: Vec<String>,
    /// Completion fraction, carried opaquely for consumers.
    pub progress: Option<f64>,
    /// Priority label, carried opaquely for consumers.
    pub priority: Option<String>,
}

impl WorkItem {
    /// Interval-based descendancy test.
    ///
    /// Returns `false` when either side lacks interval bounds.
    pub fn is_descendant_of(&self, other: &WorkItem) -> bool {
        match (&self.interval, &other.interval) {
            (Some(a), Some(b)) => a.is_inside(b),
            _ => false,
        }
    }

    /// Whether this item declares itself as its own parent.
    pub fn is_self_parented(&self) -> bool {
        self.parent_id.as_deref() == Some(self.id.as_str())
    }
}
