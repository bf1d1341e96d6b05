//! Error types for EngageKit.
//!
//! The taxonomy is deliberately small: storage failures are transient and
//! query paths degrade to empty defaults rather than surfacing them to the
//! end user; a missing summary is a valid zero-state and is modeled as
//! `Option::None`, never as an error.

use thiserror::Error;

/// The main error type for EngageKit operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    // ==================== Storage Errors ====================
    /// A read or write against the backing store failed.
    #[error("Store error: {message}")]
    Store { message: String },

    /// The store does not support server-side range queries.
    #[error("Range queries not supported by this store")]
    RangeQueriesUnsupported,

    // ==================== Ingestion Errors ====================
    /// The event kind is not valid for the attempted operation.
    #[error("Unsupported event kind for this operation: {kind}")]
    UnsupportedKind { kind: String },

    // ==================== Internal Errors ====================
    /// Serialization/deserialization failed.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AnalyticsError {
    /// Creates a new store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates a new unsupported-kind error.
    pub fn unsupported_kind(kind: impl std::fmt::Display) -> Self {
        Self::UnsupportedKind {
            kind: kind.to_string(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the error is a transient storage failure, i.e. one
    /// that query paths should degrade around rather than propagate.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::RangeQueriesUnsupported)
    }
}

/// A Result type alias using AnalyticsError.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
