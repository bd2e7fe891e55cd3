//! # Error Types
//!
//! Crate-wide error taxonomy for contact synchronization. Every failure that
//! crosses a public boundary is one of these variants; store failures are
//! classified (see [`crate::store::StoreFailureClassifier`]) before they get
//! here, so callers never string-match backend messages.

use crate::config::ConfigurationError;
use crate::state_machine::StateMachineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Header row missing or unusable. Fatal to the read.
    #[error("Schema error: {reason}")]
    Schema { reason: String },

    /// Row address or store reference no longer valid. Caller must re-sync.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Backing store denied access. The message is the store's own text.
    #[error("Permission denied during {operation}: {message}")]
    Permission { operation: String, message: String },

    /// Network, rate-limit or backing-service fault. Safe to retry with backoff.
    #[error("Transient store error during {operation}: {message}")]
    TransientStore { operation: String, message: String },

    /// Caller input rejected before any store access.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed in the session's current state.
    #[error("Invalid session operation: {0}")]
    InvalidSession(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse category used for caller-facing messaging and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Schema,
    NotFound,
    Permission,
    Transient,
    Validation,
    State,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Schema => write!(f, "schema"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Permission => write!(f, "permission"),
            ErrorCategory::Transient => write!(f, "transient"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::State => write!(f, "state"),
            ErrorCategory::Configuration => write!(f, "configuration"),
        }
    }
}

impl SyncError {
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn permission(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permission {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientStore {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Only transient store faults may be retried without operator action.
    /// This crate never retries internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Permission { .. } => ErrorCategory::Permission,
            Self::TransientStore { .. } => ErrorCategory::Transient,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::InvalidSession(_) => ErrorCategory::State,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Suggested next step for the caller, suitable for an operator-facing message
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "Repair the sheet's header row before retrying",
            Self::NotFound { .. } => "Reload the pending list; the row or sheet has moved",
            Self::Permission { .. } => "Share the sheet with the service account or fix its credentials",
            Self::TransientStore { .. } => {
                "Retry with backoff; re-read the pending list since a write may have applied"
            }
            Self::Validation(_) => "Correct the request and try again",
            Self::InvalidSession(_) => "Load a batch before completing contacts",
            Self::Configuration(_) => "Fix the configuration and restart",
        }
    }
}

impl From<ConfigurationError> for SyncError {
    fn from(err: ConfigurationError) -> Self {
        SyncError::Configuration(err.to_string())
    }
}

impl From<StateMachineError> for SyncError {
    fn from(err: StateMachineError) -> Self {
        SyncError::InvalidSession(err.to_string())
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(SyncError::transient("read", "503 backend unavailable").is_retryable());
        assert!(!SyncError::not_found("row 7").is_retryable());
        assert!(!SyncError::permission("write", "denied").is_retryable());
        assert!(!SyncError::schema("no header").is_retryable());
        assert!(!SyncError::validation("blank").is_retryable());
    }

    #[test]
    fn test_permission_message_is_kept_verbatim() {
        let err = SyncError::permission("write_cells", "The caller does not have permission");
        assert_eq!(
            err.to_string(),
            "Permission denied during write_cells: The caller does not have permission"
        );
        assert_eq!(err.category(), ErrorCategory::Permission);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
        assert_eq!(ErrorCategory::Transient.to_string(), "transient");
    }
}
