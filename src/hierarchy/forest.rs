//! # Forest Builder
//!
//! Two-pass assembly of a proper forest from a flat item batch.
//!
//! Pass 1 collects the complete id table before any linking happens, so a
//! child listed ahead of its parent is never misclassified as an orphan.
//! Pass 2 routes each item: no parent means root, a parent present in the
//! batch means child, a parent absent from the batch (filtered out by a
//! partial fetch, for example) means the item is promoted to a root rather
//! than discarded. A self-referential parent is promoted the same way.
//!
//! O(n) time and space; one hash lookup per item. No item is ever dropped.

use crate::models::{IntervalBounds, WorkItem};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// An item with exclusively owned children (the forest is never a DAG).
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub item: WorkItem,
    /// Insertion order equals discovery order in the input batch.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(item: WorkItem) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    /// Total number of items in this subtree, including self.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Build a forest of root nodes from a flat item batch.
///
/// Roots and siblings preserve the relative order of the input sequence;
/// pre-sort `items` if a different ordering is wanted.
pub fn build_forest(items: Vec<WorkItem>) -> Vec<TreeNode> {
    if items.is_empty() {
        return Vec::new();
    }

    // Pass 1: complete id table. Must finish before any linking so forward
    // references are not mistaken for orphans.
    let known_ids: HashSet<String> = items.iter().map(|i| i.id.clone()).collect();

    // Pass 2: route every item to the root list or its parent's child list.
    let mut order_index: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut children_of: HashMap<String, Vec<WorkItem>> = HashMap::new();
    let mut root_items: Vec<WorkItem> = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        order_index.insert(item.id.clone(), index);
        match item.parent_id.clone() {
            Some(ref parent) if item.is_self_parented() => {
                warn!(
                    item_id = %item.id,
                    parent_id = %parent,
                    "item is its own parent, promoting to root"
                );
                root_items.push(item);
            }
            Some(parent) if known_ids.contains(&parent) => {
                children_of.entry(parent).or_default().push(item);
            }
            Some(parent) => {
                warn!(
                    item_id = %item.id,
                    parent_id = %parent,
                    "parent absent from batch, promoting orphan to root"
                );
                root_items.push(item);
            }
            None => root_items.push(item),
        }
    }

    let mut forest: Vec<TreeNode> = root_items
        .into_iter()
        .map(|item| attach_children(item, &mut children_of))
        .collect();

    // Items whose parent chain never reaches a root (mutually-parented
    // records) would otherwise be lost; promote them in input order.
    while !children_of.is_empty() {
        let next_id = children_of
            .values()
            .flatten()
            .min_by_key(|item| order_index.get(&item.id).copied().unwrap_or(usize::MAX))
            .map(|item| item.id.clone());
        let Some(next_id) = next_id else { break };
        let Some(item) = take_item(&mut children_of, &next_id) else {
            break;
        };
        warn!(item_id = %item.id, "parent chain has no root, promoting to root");
        forest.push(attach_children(item, &mut children_of));
    }

    forest
}

fn attach_children(item: WorkItem, children_of: &mut HashMap<String, Vec<WorkItem>>) -> TreeNode {
    let mut node = TreeNode::leaf(item);
    if let Some(children) = children_of.remove(&node.item.id) {
        node.children = children
            .into_iter()
            .map(|child| attach_children(child, children_of))
            .collect();
    }
    node
}

fn take_item(
    children_of: &mut HashMap<String, Vec<WorkItem>>,
    id: &str,
) -> Option<WorkItem> {
    let parent_key = children_of.iter().find_map(|(parent, children)| {
        children
            .iter()
            .any(|c| c.id == id)
            .then(|| parent.clone())
    })?;
    let children = children_of.get_mut(&parent_key)?;
    let position = children.iter().position(|c| c.id == id)?;
    let item = children.remove(position);
    if children.is_empty() {
        children_of.remove(&parent_key);
    }
    Some(item)
}

/// Flatten a forest back into items, depth-first, parents before children.
pub fn flatten_forest(forest: &[TreeNode]) -> Vec<&WorkItem> {
    fn walk<'a>(node: &'a TreeNode, out: &mut Vec<&'a WorkItem>) {
        out.push(&node.item);
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for root in forest {
        walk(root, &mut out);
    }
    out
}

/// All descendants of `ancestor` within `items`, by nested-set containment.
///
/// Answers without walking the assembled tree; items lacking interval bounds
/// are never reported.
pub fn descendants_of<'a>(
    items: &'a [WorkItem],
    ancestor: &IntervalBounds,
) -> Vec<&'a WorkItem> {
    items
        .iter()
        .filter(|item| {
            item.interval
                .map(|bounds| bounds.is_inside(ancestor))
                .unwrap_or(false)
        })
        .collect()
}
