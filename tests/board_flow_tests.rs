//! End-to-end board flows driven by the in-memory record store:
//! load, optimistic moves, confirmation, supersession, and rollback.

use anyhow::Result;
use taskboard_core::{
    BoardConfig, BoardEvent, EntityMeta, FieldMeta, InMemoryStore, MoveOutcome, RawRecord,
    SyncEngine, TaskboardError,
};

fn task(id: &str, bucket: &str, group: Option<&str>) -> RawRecord {
    let mut record = RawRecord::with_id(id);
    record.label = Some(format!("Task {id}"));
    record.bucket_key = Some(bucket.to_string());
    record.group_key = group.map(str::to_string);
    record
}

fn seeded_store(records: Vec<RawRecord>) -> InMemoryStore {
    let store = InMemoryStore::new();
    store.register_entity(EntityMeta {
        entity_type: "task".to_string(),
        fields: vec![FieldMeta::enumeration(
            "bucket_key",
            vec![
                "Open".to_string(),
                "Working".to_string(),
                "Done".to_string(),
            ],
        )],
    });
    store.insert_records("task", records);
    store
}

fn config() -> BoardConfig {
    BoardConfig {
        extra_buckets: vec![],
        ..BoardConfig::default()
    }
}

#[tokio::test]
async fn successful_move_confirms_and_reconciles() -> Result<()> {
    let store = seeded_store(vec![task("T1", "Open", None)]);
    let engine = SyncEngine::load(store.clone(), config()).await?;
    let mut events = engine.subscribe();

    assert_eq!(engine.request_move("T1", "Done")?, MoveOutcome::Requested);

    let intent = events.recv().await?;
    assert_eq!(
        intent.event,
        BoardEvent::MoveIntent {
            item_id: "T1".to_string(),
            from_bucket: "Open".to_string(),
            to_bucket: "Done".to_string(),
        }
    );

    let settled = events.recv().await?;
    assert_eq!(
        settled.event,
        BoardEvent::SettleSuccess {
            item_id: "T1".to_string(),
            bucket: "Done".to_string(),
        }
    );

    assert_eq!(engine.pending_count(), 0);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.bucket_of("T1"), Some("Done"));
    // The store was actually patched, not just the local view.
    assert_eq!(
        store.record("task", "T1").unwrap().bucket_key,
        Some("Done".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn denied_move_rolls_back_to_premove_state() -> Result<()> {
    let store = seeded_store(vec![task("T1", "Open", None), task("T2", "Working", None)]);
    let engine = SyncEngine::load(store.clone(), config()).await?;
    let before = engine.snapshot();
    let mut events = engine.subscribe();

    store.fail_next_update("workflow transition not permitted");
    engine.request_move("T1", "Done")?;

    let intent = events.recv().await?;
    assert!(matches!(intent.event, BoardEvent::MoveIntent { .. }));

    let settled = events.recv().await?;
    assert_eq!(
        settled.event,
        BoardEvent::SettleFailure {
            item_id: "T1".to_string(),
            bucket: "Open".to_string(),
            reason: "Update rejected: task/T1: workflow transition not permitted".to_string(),
        }
    );

    // Indistinguishable from having never issued the move.
    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(
        store.record("task", "T1").unwrap().bucket_key,
        Some("Open".to_string())
    );

    // The authoritative re-fetch agrees.
    engine.refresh().await?;
    assert_eq!(engine.snapshot(), before);
    Ok(())
}

#[tokio::test]
async fn repeated_move_to_same_target_is_idempotent() -> Result<()> {
    let store = seeded_store(vec![task("T1", "Open", None)]);
    let engine = SyncEngine::load(store.clone(), config()).await?;
    let mut events = engine.subscribe();

    store.hold_updates();
    assert_eq!(engine.request_move("T1", "Done")?, MoveOutcome::Requested);
    // Second request while the first is outstanding, same target: no-op.
    assert_eq!(
        engine.request_move("T1", "Done")?,
        MoveOutcome::AlreadySettled
    );
    assert_eq!(engine.pending_count(), 1);

    while store.held_update_count() == 0 {
        tokio::task::yield_now().await;
    }
    store.resume_updates();
    assert!(store.release_next_update());

    let intent = events.recv().await?;
    assert!(matches!(intent.event, BoardEvent::MoveIntent { .. }));
    let settled = events.recv().await?;
    assert!(matches!(settled.event, BoardEvent::SettleSuccess { .. }));

    // One net change across buckets; the item appears exactly once.
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.item_count(), 1);
    assert_eq!(snapshot.bucket_of("T1"), Some("Done"));
    Ok(())
}

#[tokio::test]
async fn superseded_move_ignores_stale_resolution() -> Result<()> {
    let store = seeded_store(vec![task("T1", "Open", None)]);
    let engine = SyncEngine::load(store.clone(), config()).await?;
    let mut events = engine.subscribe();

    store.hold_updates();
    engine.request_move("T1", "Working")?;
    engine.request_move("T1", "Done")?;
    assert_eq!(engine.pending_count(), 1);

    // Both confirm requests are parked; release them in issuance order, so
    // the slow first confirmation resolves while no longer authoritative.
    while store.held_update_count() < 2 {
        tokio::task::yield_now().await;
    }
    store.resume_updates();
    assert!(store.release_next_update());
    assert!(store.release_next_update());

    let first_intent = events.recv().await?;
    assert_eq!(
        first_intent.event,
        BoardEvent::MoveIntent {
            item_id: "T1".to_string(),
            from_bucket: "Open".to_string(),
            to_bucket: "Working".to_string(),
        }
    );
    let second_intent = events.recv().await?;
    assert_eq!(
        second_intent.event,
        BoardEvent::MoveIntent {
            item_id: "T1".to_string(),
            from_bucket: "Working".to_string(),
            to_bucket: "Done".to_string(),
        }
    );

    // Exactly one settlement: the superseding move's.
    let settled = events.recv().await?;
    assert_eq!(
        settled.event,
        BoardEvent::SettleSuccess {
            item_id: "T1".to_string(),
            bucket: "Done".to_string(),
        }
    );

    assert_eq!(engine.pending_count(), 0);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.bucket_of("T1"), Some("Done"));
    assert_eq!(
        store.record("task", "T1").unwrap().bucket_key,
        Some("Done".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn superseded_move_rolls_back_to_original_bucket() -> Result<()> {
    let store = seeded_store(vec![task("T1", "Open", None)]);
    let engine = SyncEngine::load(store.clone(), config()).await?;
    let mut events = engine.subscribe();

    // Park only the first confirm request.
    store.hold_updates();
    engine.request_move("T1", "Working")?;
    while store.held_update_count() == 0 {
        tokio::task::yield_now().await;
    }
    store.resume_updates();

    // The superseding move's confirm is denied. Rollback must use the
    // ORIGINAL bucket, not the intermediate one.
    store.fail_next_update("rejected");
    engine.request_move("T1", "Done")?;

    loop {
        let published = events.recv().await?;
        if let BoardEvent::SettleFailure { item_id, bucket, .. } = published.event {
            assert_eq!(item_id, "T1");
            assert_eq!(bucket, "Open");
            break;
        }
    }
    assert_eq!(engine.pending_count(), 0);

    // Unpark the stale first confirm; its late resolution must be ignored.
    assert!(store.release_next_update());
    engine.refresh().await?;
    assert_eq!(engine.pending_count(), 0);
    Ok(())
}

#[tokio::test]
async fn grouped_fetch_builds_per_project_forests() -> Result<()> {
    let mut child = task("2", "Open", Some("P"));
    child.parent_id = Some("1".to_string());
    let store = seeded_store(vec![
        task("1", "Open", Some("P")),
        child,
        task("3", "Done", Some("Q")),
    ]);
    let engine = SyncEngine::load(store, config()).await?;

    let groups = engine.fetch_groups().await?;
    assert_eq!(groups.len(), 2);

    let p = groups.iter().find(|g| g.key == "P").unwrap();
    assert_eq!(p.roots.len(), 1);
    assert_eq!(p.roots[0].item.id, "1");
    assert_eq!(p.roots[0].children.len(), 1);
    assert_eq!(p.roots[0].children[0].item.id, "2");

    let q = groups.iter().find(|g| g.key == "Q").unwrap();
    assert_eq!(q.roots.len(), 1);
    assert_eq!(q.roots[0].item.id, "3");
    assert!(q.roots[0].children.is_empty());
    Ok(())
}

#[tokio::test]
async fn unusable_scheme_degrades_without_breaking_hierarchy_views() -> Result<()> {
    use taskboard_core::records::{BoardQuery, RecordStore};

    let store = InMemoryStore::new();
    store.register_entity(EntityMeta {
        entity_type: "task".to_string(),
        fields: vec![FieldMeta::enumeration("bucket_key", vec![])],
    });
    store.insert_records("task", vec![task("T1", "Open", None)]);

    let err = SyncEngine::load(store.clone(), config()).await.unwrap_err();
    assert!(matches!(err, TaskboardError::SchemeError(_)));

    // The tree view stays independently functional.
    let cfg = config();
    let records = store.list("task", &BoardQuery::new(&cfg).build()).await?;
    let items = taskboard_core::models::record::validate_batch(records);
    let forest = taskboard_core::build_forest(items);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].item.id, "T1");
    Ok(())
}

#[tokio::test]
async fn excluded_buckets_are_filtered_from_the_board() -> Result<()> {
    let store = seeded_store(vec![
        task("T1", "Open", None),
        task("T2", "Cancelled", None),
    ]);
    let engine = SyncEngine::load(store, config()).await?;

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.item_count(), 1);
    assert_eq!(snapshot.bucket_of("T2"), None);
    Ok(())
}
