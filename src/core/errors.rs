use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum BillsplitError {
    /// Referenced entity is missing or archived
    #[error("{0} not found")]
    NotFound(String),

    /// Actor lacks ownership, admin role or membership
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation not valid for the entity's current status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Share percentages do not add up to 100
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Invalid input for field `{}`: {}", .0.field, .0.description)]
    ValidationError(FieldError),

    /// Bearer token missing, malformed or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Event delivery error: {0}")]
    EventError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl BillsplitError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        BillsplitError::NotFound(format!("{} {}", kind, id))
    }

    pub fn validation(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        BillsplitError::ValidationError(FieldError::new(field, title, description))
    }
}
