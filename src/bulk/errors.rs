//! Error types for bulk body compilation
//!
//! Store failures are carried through unchanged so callers can decide whether
//! to retry; this crate never retries on its own.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for bulk compilation
pub type BulkResult<T> = Result<T, BulkError>;

/// Failures reported by a [`StoreQueryClient`](super::StoreQueryClient)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection or request transport failed
    #[error("Store transport failed: {0}")]
    Transport(String),

    /// Query did not answer in time
    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),

    /// Store answered with something that could not be understood
    #[error("Unexpected store response: {0}")]
    Protocol(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        StoreError::Other(error.to_string())
    }
}

impl StoreError {
    /// Check if the failure is worth retrying by the caller
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Timeout(_))
    }
}

/// Error types for bulk body compilation
#[derive(Debug, Error)]
pub enum BulkError {
    /// Batched parent lookup failed
    #[error("Parent lookup for {count} ids failed: {source}")]
    ParentLookup {
        count: usize,
        #[source]
        source: StoreError,
    },

    /// Single-id routing lookup failed
    #[error("Routing lookup for document {id} failed: {source}")]
    RoutingLookup {
        id: String,
        #[source]
        source: StoreError,
    },

    /// Document composer rejected an object
    #[error("Failed to compose document {}: {message}", id.as_deref().unwrap_or("<no id>"))]
    Compose { id: Option<String>, message: String },

    /// Composer crutches could not be built for the batch
    #[error("Failed to build composer crutches: {0}")]
    Crutches(String),

    /// Type mapping could not be interpreted
    #[error("Invalid type mapping: {0}")]
    Mapping(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for BulkError {
    fn from(error: anyhow::Error) -> Self {
        BulkError::Other(error.to_string())
    }
}

impl BulkError {
    /// Check if the underlying store failure is transient
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            BulkError::ParentLookup { source, .. } | BulkError::RoutingLookup { source, .. } => {
                source.is_transient()
            }
            _ => false,
        }
    }

    /// The store failure behind this error, if any
    #[must_use]
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            BulkError::ParentLookup { source, .. } | BulkError::RoutingLookup { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
