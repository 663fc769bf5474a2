//! # Record Store Seam
//!
//! The external flat-record source consumed by the board core. The store is a
//! black box reachable through three operations: `list` (flat records),
//! `describe` (entity metadata, including enumeration values for bucket
//! derivation), and `update` (the move-confirm endpoint).
//!
//! Adapters implement [`RecordStore`] for a concrete backend and map its
//! column names onto the canonical [`RawRecord`](crate::models::RawRecord)
//! fields. [`memory::InMemoryStore`] is a complete in-process implementation
//! used by the integration tests and suitable for embedding.

pub mod memory;
pub mod meta;
pub mod query;

use crate::models::RawRecord;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::InMemoryStore;
pub use meta::{EntityMeta, FieldKind, FieldMeta};
pub use query::{BoardQuery, Filter, FilterOp, ListQuery, OrderBy, SortDirection};

/// Errors surfaced by a record store implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Unknown entity type: {entity_type}")]
    UnknownEntity { entity_type: String },

    #[error("Record not found: {entity_type}/{id}")]
    NotFound { entity_type: String, id: String },

    #[error("Update rejected: {entity_type}/{id}: {reason}")]
    Rejected {
        entity_type: String,
        id: String,
        reason: String,
    },

    #[error("Malformed record payload: {message}")]
    Malformed { message: String },
}

/// Asynchronous record source and move-confirm endpoint.
///
/// `update` must be idempotent from the caller's perspective: confirming the
/// same move twice is a no-op acknowledgement of already-applied state.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List flat records of the given entity type matching the query.
    async fn list(
        &self,
        entity_type: &str,
        query: &ListQuery,
    ) -> Result<Vec<RawRecord>, StoreError>;

    /// Describe an entity type's fields, including enumeration values.
    async fn describe(&self, entity_type: &str) -> Result<EntityMeta, StoreError>;

    /// Apply a partial update to one record (the move-confirm endpoint).
    async fn update(
        &self,
        entity_type: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), StoreError>;
}
