//! Entity metadata returned by [`RecordStore::describe`](super::RecordStore::describe).
//!
//! Bucket schemes are derived from the `allowed_values` of an enumeration
//! field rather than hardcoded; declaration order is display order.

use serde::{Deserialize, Serialize};

/// Field kind as declared by the backend schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Timestamp,
    Reference,
    Enumeration,
}

/// One field of an entity's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    pub kind: FieldKind,
    /// Present when `kind` is [`FieldKind::Enumeration`]; ordered.
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

impl FieldMeta {
    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Enumeration,
            allowed_values: Some(values),
        }
    }
}

/// Schema description for one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub entity_type: String,
    pub fields: Vec<FieldMeta>,
}

impl EntityMeta {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }
}
