//! # Sync Engine
//!
//! Owns the bucketed snapshot and the optimistic move protocol.
//!
//! `request_move` returns before any network round-trip: the snapshot is
//! mutated synchronously, the confirm request is spawned, and resolution is
//! reconciled later. Two outstanding confirmations for different items are
//! independent; for the same item, the supersession token in the pending
//! ledger decides which resolution is still authoritative - a stale
//! resolution is discarded without touching the snapshot.

use crate::board::{BoardSnapshot, BucketScheme};
use crate::config::BoardConfig;
use crate::error::TaskboardError;
use crate::events::publisher::PublishedEvent;
use crate::events::{BoardEvent, EventPublisher};
use crate::hierarchy::{build_forest, partition_by_group, Group, TreeNode};
use crate::models::record::validate_batch;
use crate::records::{BoardQuery, RecordStore, StoreError};
use crate::sync::pending::{MoveState, PendingMove};
use crate::sync::SyncError;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The optimistic move was applied and a confirm request dispatched.
    Requested,
    /// The item already sits in the target bucket; nothing was done.
    AlreadySettled,
}

struct EngineInner<S> {
    store: S,
    config: BoardConfig,
    scheme: BucketScheme,
    snapshot: RwLock<BoardSnapshot>,
    // Lock order: `pending` before `snapshot` whenever both are held.
    pending: Mutex<HashMap<String, PendingMove>>,
    next_token: AtomicU64,
    events: EventPublisher,
}

/// Single-writer, multi-reader engine for one board view session.
///
/// Cheaply cloneable; clones share state. Readers treat every returned
/// snapshot, forest, or group list as an immutable value to be discarded
/// and replaced, never patched in place.
pub struct SyncEngine<S: RecordStore + 'static> {
    inner: Arc<EngineInner<S>>,
}

impl<S: RecordStore + 'static> std::fmt::Debug for SyncEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine").finish_non_exhaustive()
    }
}

impl<S: RecordStore + 'static> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RecordStore + 'static> SyncEngine<S> {
    /// Create an engine with an empty snapshot; call [`refresh`](Self::refresh)
    /// to populate it.
    pub fn new(store: S, config: BoardConfig, scheme: BucketScheme) -> Self {
        let snapshot = scheme.snapshot(Vec::new());
        let events = EventPublisher::new(config.event_capacity);
        Self {
            inner: Arc::new(EngineInner {
                store,
                config,
                scheme,
                snapshot: RwLock::new(snapshot),
                pending: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(0),
                events,
            }),
        }
    }

    /// Derive the bucket scheme from store metadata and load the initial
    /// snapshot.
    pub async fn load(store: S, config: BoardConfig) -> crate::error::Result<Self> {
        let meta = store
            .describe(&config.entity_type)
            .await
            .map_err(TaskboardError::from)?;
        let scheme =
            BucketScheme::from_metadata(&meta, &config.bucket_field, &config.extra_buckets)?;
        let engine = Self::new(store, config, scheme);
        engine.refresh().await?;
        crate::logging::log_board_operation(
            "load",
            Some(engine.inner.config.entity_type.as_str()),
            Some(engine.snapshot().item_count()),
            "loaded",
            None,
        );
        Ok(engine)
    }

    /// The declared bucket scheme for this session.
    pub fn scheme(&self) -> &BucketScheme {
        &self.inner.scheme
    }

    /// Cloned, immutable view of the current snapshot.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.snapshot.read().clone()
    }

    /// Subscribe to move lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.inner.events.subscribe()
    }

    /// Number of moves awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Observable move state of one item, if the engine knows it.
    pub fn move_state(&self, item_id: &str) -> Option<MoveState> {
        let pending = self.inner.pending.lock();
        if let Some(entry) = pending.get(item_id) {
            return Some(MoveState::Pending {
                from: entry.from_bucket.clone(),
                to: entry.to_bucket.clone(),
            });
        }
        drop(pending);
        self.inner
            .snapshot
            .read()
            .bucket_of(item_id)
            .map(|bucket| MoveState::Settled {
                bucket: bucket.to_string(),
            })
    }

    /// Request a move of `item_id` into `to_bucket`.
    ///
    /// Applies the move to the snapshot immediately and returns without
    /// waiting for the store; the confirm request resolves in the
    /// background. A request targeting the item's current bucket is a
    /// no-op. A request for an item with an outstanding move supersedes it.
    pub fn request_move(&self, item_id: &str, to_bucket: &str) -> Result<MoveOutcome, SyncError> {
        if !self.inner.scheme.contains(to_bucket) {
            return Err(SyncError::UnknownBucket {
                bucket: to_bucket.to_string(),
            });
        }

        let mut pending = self.inner.pending.lock();
        let mut snapshot = self.inner.snapshot.write();

        let current = snapshot
            .bucket_of(item_id)
            .map(str::to_string)
            .ok_or_else(|| SyncError::UnknownItem {
                item_id: item_id.to_string(),
            })?;
        if current == to_bucket {
            return Ok(MoveOutcome::AlreadySettled);
        }

        let token = self.inner.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        let (from_bucket, snapshot_before) = match pending.remove(item_id) {
            Some(previous) => {
                debug!(
                    item_id = %item_id,
                    superseded_to = %previous.to_bucket,
                    new_to = %to_bucket,
                    "superseding outstanding move"
                );
                (previous.from_bucket, previous.snapshot_before)
            }
            None => (current.clone(), snapshot.clone()),
        };

        let item = snapshot
            .take_item(item_id)
            .ok_or_else(|| SyncError::UnknownItem {
                item_id: item_id.to_string(),
            })?;
        snapshot.append_item(to_bucket, item);

        pending.insert(
            item_id.to_string(),
            PendingMove {
                item_id: item_id.to_string(),
                from_bucket,
                to_bucket: to_bucket.to_string(),
                snapshot_before,
                token,
            },
        );
        drop(snapshot);
        drop(pending);

        self.inner.events.publish(BoardEvent::MoveIntent {
            item_id: item_id.to_string(),
            from_bucket: current,
            to_bucket: to_bucket.to_string(),
        });
        crate::logging::log_sync_operation(
            "request_move",
            Some(item_id),
            None,
            Some(to_bucket),
            "optimistic_applied",
            None,
        );

        let engine = self.clone();
        let item_id = item_id.to_string();
        let to_bucket = to_bucket.to_string();
        tokio::spawn(async move {
            engine.confirm(item_id, to_bucket, token).await;
        });

        Ok(MoveOutcome::Requested)
    }

    /// Issue the confirm request and reconcile its resolution.
    async fn confirm(&self, item_id: String, to_bucket: String, token: u64) {
        let mut patch = Map::new();
        patch.insert(
            self.inner.config.bucket_field.clone(),
            Value::String(to_bucket),
        );
        let result = self
            .inner
            .store
            .update(&self.inner.config.entity_type, &item_id, patch)
            .await;
        self.settle(&item_id, token, result).await;
    }

    /// Reconcile one confirm resolution against the pending ledger.
    pub(crate) async fn settle(
        &self,
        item_id: &str,
        token: u64,
        result: Result<(), StoreError>,
    ) {
        let entry = {
            let mut pending = self.inner.pending.lock();
            match pending.get(item_id).map(|p| p.token) {
                Some(current) if current == token => pending.remove(item_id),
                _ => None,
            }
        };
        let Some(entry) = entry else {
            debug!(item_id = %item_id, token, "ignoring stale confirm resolution");
            return;
        };

        match result {
            Ok(()) => {
                self.inner.events.publish(BoardEvent::SettleSuccess {
                    item_id: item_id.to_string(),
                    bucket: entry.to_bucket.clone(),
                });
                crate::logging::log_sync_operation(
                    "settle",
                    Some(item_id),
                    Some(entry.from_bucket.as_str()),
                    Some(entry.to_bucket.as_str()),
                    "confirmed",
                    None,
                );
                // Reconcile fields the server may have derived as a side
                // effect of the bucket change.
                if let Err(err) = self.refresh().await {
                    warn!(error = %err, "post-confirm refresh failed");
                }
            }
            Err(store_err) => {
                {
                    let mut snapshot = self.inner.snapshot.write();
                    *snapshot = entry.snapshot_before;
                }
                self.inner.events.publish(BoardEvent::SettleFailure {
                    item_id: item_id.to_string(),
                    bucket: entry.from_bucket.clone(),
                    reason: store_err.to_string(),
                });
                error!(
                    item_id = %item_id,
                    from_bucket = %entry.from_bucket,
                    to_bucket = %entry.to_bucket,
                    error = %store_err,
                    "move confirmation failed, snapshot rolled back"
                );
                // The rollback is a best-effort immediate fix; the re-fetch
                // is the authoritative correction.
                if let Err(err) = self.refresh().await {
                    warn!(error = %err, "post-failure refresh failed");
                }
            }
        }
    }

    /// Re-fetch authoritative state and replace the snapshot.
    ///
    /// Moves still awaiting confirmation are re-applied on top of the fresh
    /// snapshot so an in-flight optimistic state is not clobbered.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let query = BoardQuery::new(&self.inner.config).build();
        let records = self
            .inner
            .store
            .list(&self.inner.config.entity_type, &query)
            .await?;
        let items = validate_batch(records);
        let mut fresh = self.inner.scheme.snapshot(items);

        let pending = self.inner.pending.lock();
        for entry in pending.values() {
            if let Some(item) = fresh.take_item(&entry.item_id) {
                fresh.append_item(&entry.to_bucket, item);
            }
        }
        let mut snapshot = self.inner.snapshot.write();
        *snapshot = fresh;
        Ok(())
    }

    /// Fetch the current item batch and build the ungrouped forest.
    pub async fn fetch_forest(&self) -> Result<Vec<TreeNode>, SyncError> {
        Ok(build_forest(self.fetch_items().await?))
    }

    /// Fetch the current item batch and build per-group forests.
    pub async fn fetch_groups(&self) -> Result<Vec<Group>, SyncError> {
        Ok(partition_by_group(self.fetch_items().await?))
    }

    async fn fetch_items(&self) -> Result<Vec<crate::models::WorkItem>, SyncError> {
        let query = BoardQuery::new(&self.inner.config).build();
        let records = self
            .inner
            .store
            .list(&self.inner.config.entity_type, &query)
            .await?;
        Ok(validate_batch(records))
    }
}
