//! Configuration Loader
//!
//! Environment-aware loading with the `config` crate. Sources are layered in
//! order, later ones overriding earlier ones:
//!
//! 1. `<dir>/callsheet.toml` (optional)
//! 2. `<dir>/callsheet.<environment>.toml` (optional)
//! 3. `CALLSHEET__*` environment variables, `__` separating nested keys
//!    (`CALLSHEET__ALLOCATION__BATCH_SIZE=20`)

use super::error::{ConfigResult, ConfigurationError};
use super::SyncConfig;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const ENV_PREFIX: &str = "CALLSHEET";
const ENV_SEPARATOR: &str = "__";
const BASE_FILE: &str = "callsheet";

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SyncConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Environment variable overrides are still read from the process.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_overrides(config_dir, environment, None)
    }

    /// Load with an explicit variable map standing in for the process
    /// environment, so overrides can be exercised without touching globals
    pub fn load_with_overrides(
        config_dir: Option<PathBuf>,
        environment: &str,
        variables: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));
        if !config_directory.exists() {
            debug!(
                "Configuration directory {} missing, using defaults and environment only",
                config_directory.display()
            );
        }

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let mut config = Self::build(&config_directory, environment, variables)?;
        config.environment = environment.to_string();

        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = %environment,
            policy = %config.allocation.policy,
            batch_size = config.allocation.batch_size,
            utc_offset_minutes = config.completion.utc_offset_minutes,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn build(
        config_directory: &Path,
        environment: &str,
        variables: Option<HashMap<String, String>>,
    ) -> ConfigResult<SyncConfig> {
        let base = config_directory.join(BASE_FILE);
        let overlay = config_directory.join(format!("{BASE_FILE}.{environment}"));

        let settings = Config::builder()
            .add_source(
                File::with_name(&base.to_string_lossy())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                File::with_name(&overlay.to_string_lossy())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(variables),
            )
            .build()
            .map_err(|e| ConfigurationError::source_error(config_directory.display().to_string(), e))?;

        settings
            .try_deserialize::<SyncConfig>()
            .map_err(ConfigurationError::deserialize_error)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// `CALLSHEET_ENV`, then `APP_ENV`, else `development`
    pub fn detect_environment() -> String {
        env::var("CALLSHEET_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::AllocationPolicy;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::load_with_overrides(
            Some(dir.path().join("absent")),
            "test",
            Some(HashMap::new()),
        )
        .unwrap();
        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config().environment, "test");
        assert_eq!(manager.config().allocation.batch_size, 12);
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "callsheet.toml",
            r#"
[store]
spreadsheet_id = "base-sheet"
sheet_name = "Calls"

[allocation]
batch_size = 8
"#,
        );
        write(
            &dir,
            "callsheet.production.toml",
            r#"
[allocation]
policy = "always_all"
"#,
        );

        let manager = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "production",
            Some(HashMap::new()),
        )
        .unwrap();
        let config = manager.config();
        assert_eq!(config.store.spreadsheet_id, "base-sheet");
        assert_eq!(config.store.sheet_name, "Calls");
        assert_eq!(config.allocation.batch_size, 8);
        assert_eq!(config.allocation.to_policy().unwrap(), AllocationPolicy::AlwaysAll);
    }

    #[test]
    fn test_variables_override_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "callsheet.toml", "[allocation]\nbatch_size = 8\n");

        let variables = HashMap::from([
            ("CALLSHEET__ALLOCATION__BATCH_SIZE".to_string(), "20".to_string()),
            ("CALLSHEET__ALLOCATION__SEED".to_string(), "7".to_string()),
            ("CALLSHEET__STORE__REQUEST_TIMEOUT_MS".to_string(), "1500".to_string()),
        ]);
        let manager =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", Some(variables))
                .unwrap();
        let config = manager.config();
        assert_eq!(config.allocation.batch_size, 20);
        assert_eq!(config.allocation.seed, Some(7));
        assert_eq!(config.store.request_timeout_ms, Some(1500));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        write(&dir, "callsheet.toml", "[allocation]\nbatch_size = 0\n");
        let err = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "test",
            Some(HashMap::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_malformed_file_is_a_source_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "callsheet.toml", "[allocation\nbatch_size = ");
        let err = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "test",
            Some(HashMap::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::SourceError { .. }));
    }
}
