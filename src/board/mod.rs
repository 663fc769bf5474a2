//! # Bucket Classification
//!
//! Derives the ordered bucket set for a board from declarative entity
//! metadata and assigns every item to exactly one bucket.
//!
//! The scheme is derived once per view session and stays stable for its
//! lifetime. Classification never drops an item from view: a stale or
//! undeclared bucket value falls back to the first declared bucket, the
//! same philosophy as orphan promotion in the hierarchy layer.

pub mod scheme;
pub mod snapshot;

pub use scheme::{BucketScheme, SchemeError};
pub use snapshot::{BoardSnapshot, Bucket};
