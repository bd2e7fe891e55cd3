use serde::{Deserialize, Serialize};

/// Events that drive session state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// A fresh read produced a non-empty batch of this size
    BatchLoaded(usize),
    /// A fresh read found nothing left to assign
    NothingPending,
    /// A record was completed and the batch still holds others
    ContactCompleted,
    /// The last record of the batch was completed
    LastContactCompleted,
}

impl SessionEvent {
    /// String representation for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::BatchLoaded(_) => "batch_loaded",
            Self::NothingPending => "nothing_pending",
            Self::ContactCompleted => "contact_completed",
            Self::LastContactCompleted => "last_contact_completed",
        }
    }

    /// Event for the outcome of a load that produced `size` records
    pub fn for_batch(size: usize) -> Self {
        if size == 0 {
            Self::NothingPending
        } else {
            Self::BatchLoaded(size)
        }
    }

    /// Event for a completion that left `remaining` records in the batch
    pub fn for_completion(remaining: usize) -> Self {
        if remaining == 0 {
            Self::LastContactCompleted
        } else {
            Self::ContactCompleted
        }
    }
}
