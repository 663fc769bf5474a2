use crate::error::{Result, TaskboardError};

/// Runtime configuration for a board view session.
///
/// Field names refer to the canonical record fields exposed by the
/// [`RecordStore`](crate::records::RecordStore) adapter, not to any
/// backend-specific column names.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Entity type queried from the record store (e.g. "task").
    pub entity_type: String,
    /// Metadata field whose enumeration values declare the buckets; also the
    /// patch key sent on a move confirmation.
    pub bucket_field: String,
    /// Record field that carries the owning-group key.
    pub group_field: String,
    /// Operator-mandated buckets appended to the declared scheme when absent.
    pub extra_buckets: Vec<String>,
    /// Bucket values excluded from the standard board query.
    pub excluded_buckets: Vec<String>,
    /// Maximum number of records fetched per list query.
    pub fetch_limit: usize,
    /// Capacity of the board event broadcast channel.
    pub event_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            entity_type: "task".to_string(),
            bucket_field: "bucket_key".to_string(),
            group_field: "group_key".to_string(),
            extra_buckets: vec!["On Hold".to_string()],
            excluded_buckets: vec!["Cancelled".to_string()],
            fetch_limit: 500,
            event_capacity: 1000,
        }
    }
}

impl BoardConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(entity) = std::env::var("TASKBOARD_ENTITY_TYPE") {
            config.entity_type = entity;
        }

        if let Ok(field) = std::env::var("TASKBOARD_BUCKET_FIELD") {
            config.bucket_field = field;
        }

        if let Ok(field) = std::env::var("TASKBOARD_GROUP_FIELD") {
            config.group_field = field;
        }

        if let Ok(extras) = std::env::var("TASKBOARD_EXTRA_BUCKETS") {
            config.extra_buckets = parse_list(&extras);
        }

        if let Ok(excluded) = std::env::var("TASKBOARD_EXCLUDED_BUCKETS") {
            config.excluded_buckets = parse_list(&excluded);
        }

        if let Ok(limit) = std::env::var("TASKBOARD_FETCH_LIMIT") {
            config.fetch_limit = limit.parse().map_err(|e| {
                TaskboardError::ConfigurationError(format!("Invalid fetch_limit: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("TASKBOARD_EVENT_CAPACITY") {
            config.event_capacity = capacity.parse().map_err(|e| {
                TaskboardError::ConfigurationError(format!("Invalid event_capacity: {e}"))
            })?;
        }

        Ok(config)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.entity_type, "task");
        assert_eq!(config.bucket_field, "bucket_key");
        assert_eq!(config.fetch_limit, 500);
        assert_eq!(config.extra_buckets, vec!["On Hold".to_string()]);
        assert_eq!(config.excluded_buckets, vec!["Cancelled".to_string()]);
    }

    #[test]
    fn test_parse_list_trims_and_drops_empties() {
        assert_eq!(
            parse_list("On Hold, Blocked ,,"),
            vec!["On Hold".to_string(), "Blocked".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_from_env_rejects_bad_limit() {
        std::env::set_var("TASKBOARD_FETCH_LIMIT", "not-a-number");
        let result = BoardConfig::from_env();
        std::env::remove_var("TASKBOARD_FETCH_LIMIT");
        assert!(matches!(
            result,
            Err(TaskboardError::ConfigurationError(_))
        ));
    }
}
