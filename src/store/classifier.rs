//! # Store Failure Classification
//!
//! Maps raw backend failures onto the crate's error taxonomy. Status codes are
//! authoritative when present; message patterns only decide between
//! categories when the status is missing or ambiguous (spreadsheet APIs report
//! a missing tab as a 400 "Unable to parse range").

use super::StoreFailure;
use crate::error::SyncError;
use crate::models::StoreRef;
use tracing::warn;

const NOT_FOUND_PATTERNS: &[&str] = &[
    "not found",
    "unable to parse range",
    "does not exist",
    "no such sheet",
];

const PERMISSION_PATTERNS: &[&str] = &[
    "permission",
    "forbidden",
    "unauthorized",
    "access denied",
    "insufficient authentication",
];

/// Default classifier used by the [`super::StoreGateway`]
#[derive(Debug, Clone, Default)]
pub struct StoreFailureClassifier;

impl StoreFailureClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a failure raised while performing `operation` against `store`
    pub fn classify(&self, operation: &str, store: &StoreRef, failure: StoreFailure) -> SyncError {
        let classified = match failure.status {
            Some(404) => SyncError::not_found(format!("{store}: {}", failure.message)),
            Some(401) | Some(403) => SyncError::permission(operation, failure.message.clone()),
            Some(408) | Some(429) => SyncError::transient(operation, failure.message.clone()),
            Some(status) if status >= 500 => {
                SyncError::transient(operation, format!("{status}: {}", failure.message))
            }
            _ => self.classify_by_message(operation, store, &failure),
        };

        warn!(
            operation = %operation,
            store = %store,
            status = ?failure.status,
            category = %classified.category(),
            retryable = classified.is_retryable(),
            "Store request failed: {}",
            failure.message
        );

        classified
    }

    fn classify_by_message(
        &self,
        operation: &str,
        store: &StoreRef,
        failure: &StoreFailure,
    ) -> SyncError {
        let lowered = failure.message.to_lowercase();
        if PERMISSION_PATTERNS.iter().any(|p| lowered.contains(p)) {
            SyncError::permission(operation, failure.message.clone())
        } else if NOT_FOUND_PATTERNS.iter().any(|p| lowered.contains(p)) {
            SyncError::not_found(format!("{store}: {}", failure.message))
        } else {
            let message = match failure.status {
                Some(status) => format!("{status}: {}", failure.message),
                None => failure.message.clone(),
            };
            SyncError::transient(operation, message)
        }
    }
}
