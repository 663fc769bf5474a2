//! # Group Partitioner
//!
//! Splits an item batch by owning-group key, then builds one forest per
//! group. Partitioning first keeps overall assembly O(n) instead of
//! O(n * group count).
//!
//! Parent references are not expected to cross group boundaries; when one
//! does, the child is treated as a root within its own group, consistent
//! with orphan promotion in [`build_forest`](super::build_forest).

use crate::hierarchy::forest::{build_forest, TreeNode};
use crate::models::WorkItem;
use std::collections::HashMap;

/// Sentinel key for items that carry no owning group.
pub const UNGROUPED_KEY: &str = "[ungrouped]";

/// A named group with its own forest of roots.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: String,
    pub title: String,
    pub roots: Vec<TreeNode>,
}

impl Group {
    /// Whether this is the ungrouped sentinel.
    pub fn is_ungrouped(&self) -> bool {
        self.key == UNGROUPED_KEY
    }

    /// Total items across this group's forest.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TreeNode::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Partition items by group key and build a forest per group.
///
/// Items keep first-seen order within their group. Groups are sorted by
/// title ascending, except the ungrouped sentinel which always sorts last.
pub fn partition_by_group(items: Vec<WorkItem>) -> Vec<Group> {
    let mut group_order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (String, Vec<WorkItem>)> = HashMap::new();

    for item in items {
        let key = item
            .group_key
            .clone()
            .unwrap_or_else(|| UNGROUPED_KEY.to_string());
        let title = item.group_title.clone().unwrap_or_else(|| key.clone());

        let entry = grouped.entry(key.clone()).or_insert_with(|| {
            group_order.push(key.clone());
            (title, Vec::new())
        });
        entry.1.push(item);
    }

    let mut groups: Vec<Group> = Vec::with_capacity(group_order.len());
    for key in group_order {
        if let Some((title, members)) = grouped.remove(&key) {
            groups.push(Group {
                roots: build_forest(members),
                key,
                title,
            });
        }
    }

    groups.sort_by(|a, b| {
        (a.is_ungrouped(), &a.title).cmp(&(b.is_ungrouped(), &b.title))
    });
    groups
}
