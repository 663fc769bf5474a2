use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskboardError {
    RecordStoreError(String),
    SchemeError(String),
    SyncError(String),
    ValidationError(String),
    ConfigurationError(String),
    EventError(String),
}

impl fmt::Display for TaskboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskboardError::RecordStoreError(msg) => write!(f, "Record store error: {msg}"),
            TaskboardError::SchemeError(msg) => write!(f, "Bucket scheme error: {msg}"),
            TaskboardError::SyncError(msg) => write!(f, "Sync error: {msg}"),
            TaskboardError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            TaskboardError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            TaskboardError::EventError(msg) => write!(f, "Event error: {msg}"),
        }
    }
}

impl std::error::Error for TaskboardError {}

impl From<crate::records::StoreError> for TaskboardError {
    fn from(err: crate::records::StoreError) -> Self {
        TaskboardError::RecordStoreError(err.to_string())
    }
}

impl From<crate::board::SchemeError> for TaskboardError {
    fn from(err: crate::board::SchemeError) -> Self {
        TaskboardError::SchemeError(err.to_string())
    }
}

impl From<crate::sync::SyncError> for TaskboardError {
    fn from(err: crate::sync::SyncError) -> Self {
        TaskboardError::SyncError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TaskboardError>;
