#![allow(clippy::doc_markdown)] // Allow technical terms like JSON, Kanban in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Taskboard Core
//!
//! Rust core for hierarchical task boards: reconstructs multi-level,
//! possibly multi-root item hierarchies from flat relational record sets,
//! classifies items into metadata-derived buckets, and synchronizes bucket
//! moves against a remote record store with optimistic local updates.
//!
//! ## Overview
//!
//! A board view session fetches flat records from a [`records::RecordStore`],
//! validates them once at the boundary into [`models::WorkItem`]s, then
//! derives pure views from the batch: a forest of [`hierarchy::TreeNode`]s
//! (optionally partitioned into [`hierarchy::Group`]s by owning project) and
//! a bucketed [`board::BoardSnapshot`]. The [`sync::SyncEngine`] owns the
//! snapshot and the optimistic move protocol: apply locally, confirm
//! asynchronously, roll back and re-fetch on denial.
//!
//! ## Key guarantees
//!
//! - **No item is ever dropped**: dangling and self-referential parent
//!   references are promoted to roots; bucket values outside the declared
//!   scheme fall back to the first bucket. Anomalies are logged, not thrown.
//! - **Derived views are values**: forests, groups, and snapshots are
//!   rebuilt from the latest batch, never patched in place, except for the
//!   single optimistic mutation the sync engine applies between fetches.
//! - **Per-item supersession**: a newer pending move invalidates interest in
//!   an older one's resolution; confirmations may resolve in any order.
//!
//! ## Module Organization
//!
//! - [`models`] - Validated items and the raw-record boundary
//! - [`records`] - Record store seam, list queries, entity metadata
//! - [`hierarchy`] - Forest assembly and group partitioning
//! - [`board`] - Bucket scheme derivation and the bucketed snapshot
//! - [`sync`] - Optimistic move protocol and pending-move ledger
//! - [`events`] - Move lifecycle notifications for rendering layers
//! - [`config`] - Board view configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskboard_core::config::BoardConfig;
//! use taskboard_core::records::InMemoryStore;
//! use taskboard_core::sync::SyncEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let engine = SyncEngine::load(store, BoardConfig::default()).await?;
//!
//! let groups = engine.fetch_groups().await?;
//! for group in &groups {
//!     println!("{}: {} items", group.title, group.len());
//! }
//!
//! engine.request_move("TASK-0001", "Working")?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod logging;
pub mod models;
pub mod records;
pub mod sync;

pub use board::{BoardSnapshot, Bucket, BucketScheme, SchemeError};
pub use config::BoardConfig;
pub use error::{Result, TaskboardError};
pub use events::{BoardEvent, EventPublisher};
pub use hierarchy::{
    build_forest, descendants_of, flatten_forest, partition_by_group, Group, TreeNode,
    UNGROUPED_KEY,
};
pub use models::{IntervalBounds, RawRecord, WorkItem};
pub use records::{
    BoardQuery, EntityMeta, FieldKind, FieldMeta, Filter, FilterOp, InMemoryStore, ListQuery,
    OrderBy, RecordStore, SortDirection, StoreError,
};
pub use sync::{MoveOutcome, MoveState, PendingMove, SyncEngine, SyncError};
