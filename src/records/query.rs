//! List-query types mirroring the `(field, operator, value)` filter triples
//! of relational record APIs, plus the standard board query assembler.

use crate::config::BoardConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator for one filter triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Like,
    In,
    Gt,
    Lt,
}

/// One `(field, operator, value)` filter triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Evaluate this filter against a JSON representation of a record.
    ///
    /// Missing fields compare as JSON null; `Like` matches substrings on
    /// strings only.
    pub fn matches(&self, record: &serde_json::Map<String, Value>) -> bool {
        let field_value = record.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => field_value == &self.value,
            FilterOp::Ne => field_value != &self.value,
            FilterOp::Like => match (field_value.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => haystack.contains(needle),
                _ => false,
            },
            FilterOp::In => match &self.value {
                Value::Array(candidates) => candidates.contains(field_value),
                _ => false,
            },
            FilterOp::Gt => compare_numbers(field_value, &self.value)
                .map(|ord| ord == std::cmp::Ordering::Greater)
                .unwrap_or(false),
            FilterOp::Lt => compare_numbers(field_value, &self.value)
                .map(|ord| ord == std::cmp::Ordering::Less)
                .unwrap_or(false),
        }
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    let a = a.as_f64()?;
    let b = b.as_f64()?;
    a.partial_cmp(&b)
}

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Ordering clause applied by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Query options for [`RecordStore::list`](super::RecordStore::list).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Canonical field names the caller depends on.
    pub fields: Vec<String>,
    /// Filters combined conjunctively, applied in order.
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

/// Assembles the standard item query for a board view.
///
/// Covers the fields the core consumes, excluded-bucket filters, the optional
/// single-group restriction, ascending `order_hint` ordering, and the
/// configured fetch limit.
#[derive(Debug, Clone)]
pub struct BoardQuery<'a> {
    config: &'a BoardConfig,
    group: Option<String>,
}

impl<'a> BoardQuery<'a> {
    pub fn new(config: &'a BoardConfig) -> Self {
        Self {
            config,
            group: None,
        }
    }

    /// Restrict the query to one owning group.
    pub fn for_group(mut self, group_key: impl Into<String>) -> Self {
        self.group = Some(group_key.into());
        self
    }

    pub fn build(self) -> ListQuery {
        let mut filters = Vec::new();
        if let Some(group) = self.group {
            filters.push(Filter::new(
                self.config.group_field.clone(),
                FilterOp::Eq,
                Value::String(group),
            ));
        }
        for excluded in &self.config.excluded_buckets {
            filters.push(Filter::new(
                self.config.bucket_field.clone(),
                FilterOp::Ne,
                Value::String(excluded.clone()),
            ));
        }

        ListQuery {
            fields: [
                "id",
                "label",
                "parent_id",
                "is_container",
                "bucket_key",
                "group_key",
                "group_title",
                "order_hint",
                "interval_low",
                "interval_high",
                "assignees",
                "progress",
                "priority",
            ]
            .iter()
            .map(|f| f.to_string())
            .collect(),
            filters,
            order_by: Some(OrderBy {
                field: "order_hint".to_string(),
                direction: SortDirection::Asc,
            }),
            limit: Some(self.config.fetch_limit),
        }
    }
}
