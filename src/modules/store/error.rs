use std::fmt;

use super::RecordId;

/// Errors raised by a storage backend
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    UniquenessViolation {
        table: String,
        field: String,
        value: String,
    },
    NotFound {
        table: String,
        id: RecordId,
    },
    Io(String),
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UniquenessViolation {
                table,
                field,
                value,
            } => write!(
                f,
                "Uniqueness violation: {}.{} already holds {}",
                table, field, value
            ),
            StoreError::NotFound { table, id } => {
                write!(f, "Record not found: {} #{}", table, id)
            }
            StoreError::Io(msg) => write!(f, "Storage IO error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Corrupt storage data: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io(error.to_string())
    }
}

/// Errors surfaced by the entity layer
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Deployment or setup defect, e.g. a missing hash secret
    Configuration(String),
    /// Hard delete attempted on an entity that only supports soft delete
    DeleteNotSupported { table: &'static str },
    InvalidChoice { field: String, value: String },
    /// Operation needs a primary key but the record was never saved
    NotPersisted { table: &'static str },
    Serialization(String),
    Store(StoreError),
}

impl ModelError {
    /// True when the backend rejected a write because of a unique column
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(
            self,
            ModelError::Store(StoreError::UniquenessViolation { .. })
        )
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::DeleteNotSupported { table } => write!(
                f,
                "Records in {} require a soft delete; call soft_delete() instead",
                table
            ),
            ModelError::InvalidChoice { field, value } => {
                write!(f, "Invalid choice for {}: {}", field, value)
            }
            ModelError::NotPersisted { table } => {
                write!(f, "Record in {} has not been saved yet", table)
            }
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ModelError {
    fn from(error: StoreError) -> Self {
        ModelError::Store(error)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(error: serde_json::Error) -> Self {
        ModelError::Serialization(error.to_string())
    }
}
