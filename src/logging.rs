//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem. Logs go to
//! stdout; set `LOG_FORMAT=json` for one JSON object per line.
//!
//! Level resolution: `LOG_LEVEL`, then `RUST_LOG`, then a default for the
//! environment named by `CALLSHEET_ENV` / `APP_ENV` (`production` logs at
//! `info`, everything else at `debug`).

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the global subscriber. Safe to call more than once; only the
/// first call has any effect, and an already-installed subscriber is kept.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json = use_json_format();

        // Determine if we're in a TTY for ANSI color support
        let use_ansi = !json && IsTerminal::is_terminal(&std::io::stdout());

        let console_layer = if json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                level = %log_level,
                json,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Current environment name from environment variables
pub fn get_environment() -> String {
    std::env::var("CALLSHEET_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

/// Log filter directive from environment variables or environment defaults
pub fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        return level.to_lowercase();
    }

    default_level_for(environment).to_string()
}

fn default_level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

fn use_json_format() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log a sync operation as a structured record
///
/// ```rust
/// use callsheet_core::log_sync;
///
/// log_sync!(info, "contacts.list_pending", store: "sheet-1/Sheet1", pending: 4);
/// log_sync!(debug, "store.probe");
/// ```
#[macro_export]
macro_rules! log_sync {
    // Full form with store reference
    ($level:ident, $operation:expr, store: $store:expr, $($key:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            store = %$store,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    // Simple form - just operation
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    // Generic form with additional fields
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults() {
        assert_eq!(default_level_for("production"), "info");
        assert_eq!(default_level_for("test"), "debug");
        assert_eq!(default_level_for("development"), "debug");
        assert_eq!(default_level_for("staging"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing();
        crate::log_sync!(debug, "logging.self_test", store: "sheet/Sheet1", attempt: 1);
        crate::log_sync!(debug, "logging.self_test");
        crate::log_sync!(debug, "logging.self_test", attempt: 2);
    }
}
