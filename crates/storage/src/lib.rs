//! Storage Layer
//!
//! In-memory state store with per-service version checks, and an in-memory
//! escalation policy source.

mod policies;
mod repository;

pub use policies::InMemoryPolicySource;
pub use repository::{InMemoryStateStore, StoredService};

use escalation::EscalationError;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Version conflict for service {service_id}: expected {expected}, found {found}")]
    VersionConflict {
        service_id: String,
        expected: u64,
        found: u64,
    },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Corrupt record for service {0}")]
    CorruptRecord(String),
}

impl From<StorageError> for EscalationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::VersionConflict { service_id, .. } => {
                EscalationError::Conflict { service_id }
            }
            other => EscalationError::Storage(other.to_string()),
        }
    }
}

impl From<postcard::Error> for StorageError {
    fn from(err: postcard::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}
