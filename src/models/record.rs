//! # Raw Record Boundary
//!
//! The flat wire record as returned by a record store, with every field
//! optional except `id`. Validation happens here once, not at call sites
//! reading loosely-typed fields by string key.

use crate::models::item::{IntervalBounds, WorkItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Flat record as fetched from a record store.
///
/// Store adapters map their backend's column names onto these canonical
/// fields; the core never reads backend-specific keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_container: Option<bool>,
    #[serde(default)]
    pub bucket_key: Option<String>,
    #[serde(default)]
    pub group_key: Option<String>,
    #[serde(default)]
    pub group_title: Option<String>,
    #[serde(default)]
    pub order_hint: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interval_low: Option<i64>,
    #[serde(default)]
    pub interval_high: Option<i64>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl RawRecord {
    /// Minimal record with only an id, for tests and adapters.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            parent_id: None,
            is_container: None,
            bucket_key: None,
            group_key: None,
            group_title: None,
            order_hint: None,
            interval_low: None,
            interval_high: None,
            assignees: None,
            progress: None,
            priority: None,
        }
    }

    /// Validate and normalize into a [`WorkItem`].
    ///
    /// Recoverable anomalies degrade with a `warn!` and a documented fallback;
    /// only a blank `id` is rejected outright.
    pub fn into_item(self) -> crate::error::Result<WorkItem> {
        if self.id.trim().is_empty() {
            return Err(crate::error::TaskboardError::ValidationError(
                "record has a blank id".to_string(),
            ));
        }

        let label = match self.label {
            Some(label) if !label.trim().is_empty() => label,
            _ => {
                warn!(item_id = %self.id, "record has no label, falling back to id");
                self.id.clone()
            }
        };

        // Empty-string parents are treated as absent (some backends serialize
        // NULL references that way).
        let parent_id = self.parent_id.filter(|p| !p.trim().is_empty());

        let interval = match (self.interval_low, self.interval_high) {
            (Some(low), Some(high)) => {
                let bounds = IntervalBounds::new(low, high);
                if bounds.is_none() {
                    warn!(
                        item_id = %self.id,
                        low,
                        high,
                        "discarding malformed nested-set interval"
                    );
                }
                bounds
            }
            (None, None) => None,
            _ => {
                warn!(item_id = %self.id, "discarding half-present nested-set interval");
                None
            }
        };

        Ok(WorkItem {
            id: self.id,
            label,
            parent_id,
            is_container: self.is_container.unwrap_or(false),
            bucket_key: self.bucket_key.unwrap_or_default(),
            group_key: self.group_key.filter(|g| !g.trim().is_empty()),
            group_title: self.group_title,
            order_hint: self.order_hint,
            interval,
            assignees: self.assignees.unwrap_or_default(),
            progress: self.progress,
            priority: self.priority,
        })
    }
}

/// Validate a batch of records, preserving input order.
///
/// Records rejected by [`RawRecord::into_item`] (blank id) are logged and
/// skipped; everything recoverable is kept.
pub fn validate_batch(records: Vec<RawRecord>) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        match record.into_item() {
            Ok(item) => items.push(item),
            Err(err) => warn!(error = %err, "skipping unidentifiable record"),
        }
    }
    items
}
