//! # System Constants
//!
//! Policy defaults and fixed labels that define the operational boundaries of
//! the contact synchronization engine.

use serde::{Deserialize, Serialize};

// Re-export state types for convenience
pub use crate::state_machine::SessionState as SessionStatus;

/// Structured operation names used in sync log records
pub mod operations {
    pub const LIST_PENDING: &str = "contacts.list_pending";
    pub const COMPLETE_CONTACT: &str = "contacts.complete";
    pub const PROBE_STORE: &str = "store.probe";
    pub const SESSION_STARTED: &str = "session.started";
    pub const SESSION_BATCH_LOADED: &str = "session.batch_loaded";
    pub const SESSION_CONTACT_COMPLETED: &str = "session.contact_completed";
    pub const SESSION_BATCH_EXHAUSTED: &str = "session.batch_exhausted";
    pub const SESSION_COMPLETE: &str = "session.complete";
}

/// Shape of the backing sheet
pub mod sheet {
    /// 1-based row number of the header row
    pub const HEADER_ROW: u32 = 1;

    /// 1-based row number of the first data row
    pub const FIRST_DATA_ROW: u32 = HEADER_ROW + 1;

    /// Default tab read when a store reference does not name one
    pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

    /// Widest column read when fetching whole rows
    pub const LAST_COLUMN: &str = "ZZ";
}

/// Allocation and completion policy defaults
pub mod system {
    /// Contacts handed to a caller per batch in session-shuffle mode
    pub const DEFAULT_BATCH_SIZE: usize = 12;

    /// Civil offset applied to completion timestamps (UTC+05:30)
    pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

    /// Date + 24-hour time, to the second
    pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

    /// Value written into the status column on completion
    pub const COMPLETED_STATUS_LABEL: &str = "Completed";

    /// Largest civil offset accepted by configuration validation
    pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;
}

/// What a fresh read of the store looked like, reported alongside every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCondition {
    /// The sheet has no rows at all, not even a header
    NoRows,
    /// A header row exists but no data rows follow it
    HeadersOnly,
    /// Data rows exist but every one is completed or lacks an identifier
    NothingPending,
    /// At least one contact is eligible for assignment
    Available,
}

impl StoreCondition {
    pub fn has_pending(&self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRows => "no_rows",
            Self::HeadersOnly => "headers_only",
            Self::NothingPending => "nothing_pending",
            Self::Available => "available",
        }
    }
}

impl std::fmt::Display for StoreCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
