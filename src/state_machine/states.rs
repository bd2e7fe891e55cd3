use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one calling session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, no batch requested yet
    #[default]
    Idle,
    /// A non-empty batch is being worked
    BatchLoaded,
    /// Every record in the current batch was completed locally
    BatchExhausted,
    /// Nothing pending remains anywhere
    SessionComplete,
}

impl SessionState {
    /// No further transitions allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionComplete)
    }

    /// A batch is available to work
    pub fn is_active(&self) -> bool {
        matches!(self, Self::BatchLoaded)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::BatchLoaded => write!(f, "batch_loaded"),
            Self::BatchExhausted => write!(f, "batch_exhausted"),
            Self::SessionComplete => write!(f, "session_complete"),
        }
    }
}

impl std::str::FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "batch_loaded" => Ok(Self::BatchLoaded),
            "batch_exhausted" => Ok(Self::BatchExhausted),
            "session_complete" => Ok(Self::SessionComplete),
            _ => Err(format!("Invalid session state: {s}")),
        }
    }
}
