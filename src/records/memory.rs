//! In-process [`RecordStore`] implementation.
//!
//! Backs the integration tests and small embedded deployments. Supports
//! failure injection (reject the next update with a reason) and a
//! hold/release gate so tests can decide the order in which concurrent
//! confirm requests resolve.

use crate::models::RawRecord;
use crate::records::meta::EntityMeta;
use crate::records::query::ListQuery;
use crate::records::{RecordStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct EntityTable {
    meta: Option<EntityMeta>,
    records: Vec<RawRecord>,
}

#[derive(Debug, Default)]
struct StoreInner {
    entities: Mutex<HashMap<String, EntityTable>>,
    injected_failures: Mutex<VecDeque<String>>,
    updates_held: AtomicBool,
    held_updates: Mutex<Vec<oneshot::Sender<()>>>,
}

/// Thread-safe in-memory record store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the schema description for an entity type.
    pub fn register_entity(&self, meta: EntityMeta) {
        let mut entities = self.inner.entities.lock();
        let entity_type = meta.entity_type.clone();
        entities
            .entry(entity_type)
            .or_default()
            .meta = Some(meta);
    }

    /// Insert records for an entity type, preserving insertion order.
    pub fn insert_records(&self, entity_type: &str, records: Vec<RawRecord>) {
        let mut entities = self.inner.entities.lock();
        entities
            .entry(entity_type.to_string())
            .or_default()
            .records
            .extend(records);
    }

    /// Fetch one record back out, for assertions.
    pub fn record(&self, entity_type: &str, id: &str) -> Option<RawRecord> {
        let entities = self.inner.entities.lock();
        entities
            .get(entity_type)?
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Reject the next `update` call with the given reason.
    pub fn fail_next_update(&self, reason: impl Into<String>) {
        self.inner.injected_failures.lock().push_back(reason.into());
    }

    /// Park every subsequent `update` call until released.
    pub fn hold_updates(&self) {
        self.inner.updates_held.store(true, Ordering::SeqCst);
    }

    /// Release the oldest parked update; returns whether one was waiting.
    pub fn release_next_update(&self) -> bool {
        let mut held = self.inner.held_updates.lock();
        if held.is_empty() {
            return false;
        }
        let waiter = held.remove(0);
        waiter.send(()).is_ok()
    }

    /// Stop parking new updates (already-parked calls still need releasing).
    pub fn resume_updates(&self) {
        self.inner.updates_held.store(false, Ordering::SeqCst);
    }

    /// Number of updates currently parked behind the gate.
    pub fn held_update_count(&self) -> usize {
        self.inner.held_updates.lock().len()
    }

    async fn wait_if_held(&self) {
        let receiver = {
            if !self.inner.updates_held.load(Ordering::SeqCst) {
                return;
            }
            let (tx, rx) = oneshot::channel();
            self.inner.held_updates.lock().push(tx);
            rx
        };
        // A dropped sender just unparks the call.
        let _ = receiver.await;
    }
}

fn record_as_map(record: &RawRecord) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Malformed {
            message: "record did not serialize to an object".to_string(),
        }),
        Err(e) => Err(StoreError::Malformed {
            message: e.to_string(),
        }),
    }
}

fn value_order(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    match (a, b) {
        (Value::Null, Value::Null) => Equal,
        (Value::Null, _) => Less,
        (_, Value::Null) => Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Equal,
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list(
        &self,
        entity_type: &str,
        query: &ListQuery,
    ) -> Result<Vec<RawRecord>, StoreError> {
        let entities = self.inner.entities.lock();
        let table = entities
            .get(entity_type)
            .ok_or_else(|| StoreError::UnknownEntity {
                entity_type: entity_type.to_string(),
            })?;

        let mut rows: Vec<(Map<String, Value>, RawRecord)> = Vec::new();
        for record in &table.records {
            let map = record_as_map(record)?;
            if query.filters.iter().all(|f| f.matches(&map)) {
                rows.push((map, record.clone()));
            }
        }

        if let Some(order) = &query.order_by {
            rows.sort_by(|(a, _), (b, _)| {
                let left = a.get(&order.field).unwrap_or(&Value::Null);
                let right = b.get(&order.field).unwrap_or(&Value::Null);
                let ordering = value_order(left, right);
                match order.direction {
                    crate::records::SortDirection::Asc => ordering,
                    crate::records::SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let mut records: Vec<RawRecord> = rows.into_iter().map(|(_, r)| r).collect();
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn describe(&self, entity_type: &str) -> Result<EntityMeta, StoreError> {
        let entities = self.inner.entities.lock();
        entities
            .get(entity_type)
            .and_then(|t| t.meta.clone())
            .ok_or_else(|| StoreError::UnknownEntity {
                entity_type: entity_type.to_string(),
            })
    }

    async fn update(
        &self,
        entity_type: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.wait_if_held().await;

        if let Some(reason) = self.inner.injected_failures.lock().pop_front() {
            return Err(StoreError::Rejected {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
                reason,
            });
        }

        let mut entities = self.inner.entities.lock();
        let table = entities
            .get_mut(entity_type)
            .ok_or_else(|| StoreError::UnknownEntity {
                entity_type: entity_type.to_string(),
            })?;
        let record = table
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            })?;

        let mut map = record_as_map(record)?;
        for (key, value) in patch {
            map.insert(key, value);
        }
        *record = serde_json::from_value(Value::Object(map)).map_err(|e| {
            StoreError::Malformed {
                message: e.to_string(),
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::query::{Filter, FilterOp};
    use serde_json::json;

    fn store_with_tasks() -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut a = RawRecord::with_id("A");
        a.bucket_key = Some("Open".to_string());
        let mut b = RawRecord::with_id("B");
        b.bucket_key = Some("Cancelled".to_string());
        store.insert_records("task", vec![a, b]);
        store
    }

    #[tokio::test]
    async fn test_list_applies_filters_and_limit() {
        let store = store_with_tasks();
        let query = ListQuery {
            filters: vec![Filter::new("bucket_key", FilterOp::Ne, json!("Cancelled"))],
            ..Default::default()
        };
        let records = store.list("task", &query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "A");

        let limited = ListQuery {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(store.list("task", &limited).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_entity_errors() {
        let store = InMemoryStore::new();
        let err = store.list("ghost", &ListQuery::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownEntity { .. }));
    }

    #[tokio::test]
    async fn test_update_patches_record() {
        let store = store_with_tasks();
        let mut patch = Map::new();
        patch.insert("bucket_key".to_string(), json!("Done"));
        store.update("task", "A", patch).await.unwrap();
        assert_eq!(
            store.record("task", "A").unwrap().bucket_key,
            Some("Done".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let store = store_with_tasks();
        for _ in 0..2 {
            let mut patch = Map::new();
            patch.insert("bucket_key".to_string(), json!("Done"));
            store.update("task", "A", patch).await.unwrap();
        }
        assert_eq!(
            store.record("task", "A").unwrap().bucket_key,
            Some("Done".to_string())
        );
    }

    #[tokio::test]
    async fn test_injected_failure_rejects_once() {
        let store = store_with_tasks();
        store.fail_next_update("validation failed upstream");

        let mut patch = Map::new();
        patch.insert("bucket_key".to_string(), json!("Done"));
        let err = store
            .update("task", "A", patch.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));

        // The failure is consumed; the next call succeeds.
        store.update("task", "A", patch).await.unwrap();
    }

    #[tokio::test]
    async fn test_hold_gate_parks_and_releases() {
        let store = store_with_tasks();
        store.hold_updates();

        let background = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut patch = Map::new();
                patch.insert("bucket_key".to_string(), json!("Done"));
                store.update("task", "A", patch).await
            })
        };

        // Let the background task reach the gate.
        while store.held_update_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(store.release_next_update());
        background.await.unwrap().unwrap();
        assert_eq!(
            store.record("task", "A").unwrap().bucket_key,
            Some("Done".to_string())
        );
    }
}
