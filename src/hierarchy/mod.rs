//! # Hierarchy Assembly
//!
//! Pure synchronous reconstruction of item forests from flat record batches.
//!
//! [`build_forest`] links items by `parent_id` in two passes and promotes
//! orphans to roots; [`partition_by_group`] partitions a batch by owning
//! group before building one forest per group. Both require the full item
//! batch to be materialized first - the id table must be complete before any
//! linking is attempted - and neither retains state across invocations.
//! Callers own when to recompute; the returned structures are values to be
//! replaced, never patched in place.

pub mod forest;
pub mod partition;

pub use forest::{build_forest, descendants_of, flatten_forest, TreeNode};
pub use partition::{partition_by_group, Group, UNGROUPED_KEY};
