//! Bucket scheme derivation and item classification.

use crate::board::snapshot::{BoardSnapshot, Bucket};
use crate::models::WorkItem;
use crate::records::EntityMeta;
use thiserror::Error;
use tracing::warn;

/// Errors raised while deriving a bucket scheme from metadata.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemeError {
    #[error("Classification field not declared: {field}")]
    FieldMissing { field: String },

    #[error("No usable bucket values declared for field: {field}")]
    Unavailable { field: String },
}

/// The ordered set of declared bucket keys for one view session.
///
/// Derived from the `allowed_values` of the configured classification field;
/// operator-mandated extras are appended (additive override, never removing
/// a declared bucket). Declaration order is display order.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketScheme {
    keys: Vec<String>,
}

impl BucketScheme {
    /// Derive a scheme from entity metadata.
    pub fn from_metadata(
        meta: &EntityMeta,
        field_name: &str,
        extras: &[String],
    ) -> Result<Self, SchemeError> {
        let field = meta.field(field_name).ok_or_else(|| SchemeError::FieldMissing {
            field: field_name.to_string(),
        })?;

        let mut keys: Vec<String> = field
            .allowed_values
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        if keys.is_empty() {
            return Err(SchemeError::Unavailable {
                field: field_name.to_string(),
            });
        }

        for extra in extras {
            if !keys.iter().any(|k| k == extra) {
                keys.push(extra.clone());
            }
        }

        Ok(Self { keys })
    }

    /// Declared bucket keys in display order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// The fallback bucket for undeclared values.
    pub fn first_key(&self) -> &str {
        // Derivation guarantees at least one key.
        &self.keys[0]
    }

    /// Resolve an item's bucket key against the declared scheme.
    ///
    /// A value outside the scheme (stale data) falls back to the first
    /// declared bucket so the item stays in view.
    pub fn classify<'a>(&'a self, item: &'a WorkItem) -> &'a str {
        if self.contains(&item.bucket_key) {
            &item.bucket_key
        } else {
            warn!(
                item_id = %item.id,
                bucket_key = %item.bucket_key,
                fallback = %self.first_key(),
                "bucket value outside declared scheme, using first bucket"
            );
            self.first_key()
        }
    }

    /// Build the bucketed snapshot for a batch of items.
    ///
    /// Every declared bucket appears in the snapshot, empty or not; items
    /// keep input order within their bucket.
    pub fn snapshot(&self, items: Vec<WorkItem>) -> BoardSnapshot {
        let mut buckets: Vec<Bucket> = self
            .keys
            .iter()
            .enumerate()
            .map(|(order, key)| Bucket {
                key: key.clone(),
                title: key.clone(),
                order,
                items: Vec::new(),
            })
            .collect();

        for item in items {
            let key = self.classify(&item).to_string();
            if let Some(bucket) = buckets.iter_mut().find(|b| b.key == key) {
                bucket.items.push(item);
            }
        }

        BoardSnapshot { buckets }
    }
}
