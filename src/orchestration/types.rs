//! # Orchestration Types
//!
//! Results returned by the external operations of [`super::ContactSyncService`].

use crate::constants::StoreCondition;
use crate::models::Batch;
use serde::{Deserialize, Serialize};

/// A fresh randomized batch plus what the read of the store looked like.
///
/// `condition` separates the three empty outcomes (no rows, headers only,
/// nothing pending) so callers never have to infer them from an empty batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingListing {
    pub condition: StoreCondition,
    /// Data rows with at least one non-blank cell
    pub data_rows: usize,
    pub completed_rows: usize,
    pub batch: Batch,
}

impl PendingListing {
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

/// Read-only connectivity and schema check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProbe {
    pub title: String,
    pub sheet: String,
    /// Header labels exactly as stored, empty when the sheet has no rows
    pub headers: Vec<String>,
}
