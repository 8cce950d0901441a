use tally_domain::RecordId;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Record not found: {0}")]
    NotFound(RecordId),
    #[error("Background save failed: {0}")]
    Background(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}
