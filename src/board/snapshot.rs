//! The bucketed board view.
//!
//! Snapshots are values: readers clone and replace them, never patch them in
//! place. The sync engine is the single writer and mutates its own copy
//! behind a lock; the only in-place mutation in the system is its optimistic
//! move between fetches.

use crate::models::WorkItem;
use serde::{Deserialize, Serialize};

/// A named classification slot and the items currently occupying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub title: String,
    pub order: usize,
    pub items: Vec<WorkItem>,
}

/// The full bucketed view of one item batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub buckets: Vec<Bucket>,
}

impl BoardSnapshot {
    /// Look up a bucket by key.
    pub fn bucket(&self, key: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.key == key)
    }

    /// The bucket currently holding the given item.
    pub fn bucket_of(&self, item_id: &str) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.items.iter().any(|i| i.id == item_id))
            .map(|b| b.key.as_str())
    }

    /// Total item count across all buckets.
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }

    /// Remove and return an item, wherever it currently sits.
    pub(crate) fn take_item(&mut self, item_id: &str) -> Option<WorkItem> {
        for bucket in &mut self.buckets {
            if let Some(position) = bucket.items.iter().position(|i| i.id == item_id) {
                return Some(bucket.items.remove(position));
            }
        }
        None
    }

    /// Append an item to the named bucket, stamping its `bucket_key`.
    ///
    /// Returns `false` when the bucket is not part of this snapshot.
    pub(crate) fn append_item(&mut self, bucket_key: &str, mut item: WorkItem) -> bool {
        match self.buckets.iter_mut().find(|b| b.key == bucket_key) {
            Some(bucket) => {
                item.bucket_key = bucket_key.to_string();
                bucket.items.push(item);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, bucket: &str) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            label: id.to_string(),
            parent_id: None,
            is_container: false,
            bucket_key: bucket.to_string(),
            group_key: None,
            group_title: None,
            order_hint: None,
            interval: None,
            assignees: vec![],
            progress: None,
            priority: None,
        }
    }

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot {
            buckets: vec![
                Bucket {
                    key: "Open".to_string(),
                    title: "Open".to_string(),
                    order: 0,
                    items: vec![item("T1", "Open")],
                },
                Bucket {
                    key: "Done".to_string(),
                    title: "Done".to_string(),
                    order: 1,
                    items: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_bucket_of_and_item_count() {
        let snap = snapshot();
        assert_eq!(snap.bucket_of("T1"), Some("Open"));
        assert_eq!(snap.bucket_of("ghost"), None);
        assert_eq!(snap.item_count(), 1);
    }

    #[test]
    fn test_take_and_append_moves_item_once() {
        let mut snap = snapshot();
        let moved = snap.take_item("T1").unwrap();
        assert!(snap.append_item("Done", moved));

        assert_eq!(snap.bucket_of("T1"), Some("Done"));
        assert_eq!(snap.item_count(), 1);
        assert_eq!(snap.bucket("Done").unwrap().items[0].bucket_key, "Done");
    }

    #[test]
    fn test_append_to_unknown_bucket_is_refused() {
        let mut snap = snapshot();
        let moved = snap.take_item("T1").unwrap();
        assert!(!snap.append_item("Mystery", moved));
    }
}
