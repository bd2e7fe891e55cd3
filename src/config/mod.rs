//! # Configuration
//!
//! Typed configuration for the contact sync engine. Every field has a
//! default, so an empty configuration is valid apart from the optional
//! default store reference.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use callsheet_core::config::ConfigManager;
//!
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! println!("batch size: {}", config.allocation.batch_size);
//! # Ok::<(), callsheet_core::config::ConfigurationError>(())
//! ```

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

use crate::constants::{sheet, system};
use crate::models::{ContactStatus, StoreRef};
use crate::services::AllocationPolicy;
use crate::time::CivilTimeFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub environment: String,
    pub store: StoreConfig,
    pub allocation: AllocationConfig,
    pub completion: CompletionConfig,
}

/// Default store reference and request policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Spreadsheet used when a caller does not name one; may be empty
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Upper bound on any single store call, unbounded when absent
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// `session_shuffle` or `always_all`
    pub policy: String,
    pub batch_size: usize,
    /// Fixed RNG seed for reproducible allocation; OS entropy when absent
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub utc_offset_minutes: i32,
    /// chrono `strftime` pattern
    pub timestamp_format: String,
    pub completed_label: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            store: StoreConfig::default(),
            allocation: AllocationConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: sheet::DEFAULT_SHEET_NAME.to_string(),
            request_timeout_ms: None,
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            policy: "session_shuffle".to_string(),
            batch_size: system::DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: system::DEFAULT_UTC_OFFSET_MINUTES,
            timestamp_format: system::DEFAULT_TIMESTAMP_FORMAT.to_string(),
            completed_label: system::COMPLETED_STATUS_LABEL.to_string(),
        }
    }
}

impl StoreConfig {
    /// Configured default store, if a spreadsheet id is set
    pub fn default_store_ref(&self) -> Option<StoreRef> {
        if self.spreadsheet_id.trim().is_empty() {
            return None;
        }
        Some(StoreRef::new(self.spreadsheet_id.trim(), self.sheet_name.as_str()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl AllocationConfig {
    pub fn to_policy(&self) -> ConfigResult<AllocationPolicy> {
        match self.policy.trim().to_lowercase().as_str() {
            "session_shuffle" => Ok(AllocationPolicy::session_shuffle(self.batch_size)),
            "always_all" => Ok(AllocationPolicy::AlwaysAll),
            other => Err(ConfigurationError::invalid_value(
                "allocation.policy",
                other,
                "expected session_shuffle or always_all",
            )),
        }
    }
}

impl CompletionConfig {
    pub fn time_format(&self) -> ConfigResult<CivilTimeFormat> {
        CivilTimeFormat::new(self.utc_offset_minutes, self.timestamp_format.as_str()).map_err(
            |err| {
                ConfigurationError::invalid_value(
                    "completion",
                    format!("{}/{}", self.utc_offset_minutes, self.timestamp_format),
                    err.to_string(),
                )
            },
        )
    }
}

impl SyncConfig {
    /// Check invariants the deserializer cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        let policy = self.allocation.to_policy()?;
        if policy.batch_width() == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "allocation.batch_size",
                "0",
                "batch size must be greater than 0",
            ));
        }

        if self.completion.utc_offset_minutes.abs() > system::MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigurationError::invalid_value(
                "completion.utc_offset_minutes",
                self.completion.utc_offset_minutes.to_string(),
                "offset must be within +/-18 hours",
            ));
        }

        if self.completion.timestamp_format.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "completion.timestamp_format",
                "completion configuration",
            ));
        }

        self.completion.time_format()?;

        if self.completion.completed_label.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "completion.completed_label",
                "completion configuration",
            ));
        }

        // The written label must read back as completed
        if !ContactStatus::from_cell(&self.completion.completed_label).is_completed() {
            return Err(ConfigurationError::invalid_value(
                "completion.completed_label",
                self.completion.completed_label.as_str(),
                "label must be one of completed, complete, done or called",
            ));
        }

        if self.store.request_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "store.request_timeout_ms",
                "0",
                "timeout must be greater than 0 when set",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        config.validate().unwrap();
        assert_eq!(
            config.allocation.to_policy().unwrap(),
            AllocationPolicy::session_shuffle(12)
        );
        assert!(config.store.default_store_ref().is_none());
        assert_eq!(config.completion.time_format().unwrap(), CivilTimeFormat::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SyncConfig::default();
        config.allocation.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.allocation.batch_size = 0;
        config.allocation.policy = "always_all".to_string();
        config.validate().unwrap();

        let mut config = SyncConfig::default();
        config.completion.utc_offset_minutes = 19 * 60;
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.completion.completed_label = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingRequiredField { .. })
        ));

        let mut config = SyncConfig::default();
        config.allocation.policy = "round_robin".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_completed_label_must_read_back_as_completed() {
        let mut config = SyncConfig::default();
        config.completion.completed_label = "Finished".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { ref field, .. }) if field == "completion.completed_label"
        ));

        for label in ["Done", " called ", "COMPLETE"] {
            config.completion.completed_label = label.to_string();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_timestamp_format_is_checked() {
        let mut config = SyncConfig::default();
        config.completion.timestamp_format = "%Q".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { .. })
        ));

        config.completion.timestamp_format = "%d/%m/%Y %H:%M".to_string();
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.completion.utc_offset_minutes = i32::MAX;
        assert!(config.completion.time_format().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_store_ref_and_timeout() {
        let store = StoreConfig {
            spreadsheet_id: " 1AbC ".to_string(),
            sheet_name: "Calls".to_string(),
            request_timeout_ms: Some(2_500),
        };
        assert_eq!(store.default_store_ref(), Some(StoreRef::new("1AbC", "Calls")));
        assert_eq!(store.request_timeout(), Some(Duration::from_millis(2_500)));
    }
}
