//! # Data Model Layer
//!
//! Validated item types and the raw wire-record boundary.
//!
//! Flat records arrive from the record store with every field optional;
//! [`RawRecord`] is the single place they are validated and normalized into
//! [`WorkItem`] values. Recoverable anomalies (missing label, malformed
//! nested-set interval) degrade with a logged fallback - a record is never
//! dropped for being messy, only for lacking an id.

pub mod item;
pub mod record;

pub use item::{IntervalBounds, WorkItem};
pub use record::{validate_batch, RawRecord};
