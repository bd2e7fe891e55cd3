//! # Test Utilities
//!
//! Fixtures shared by unit tests and the integration tests under `tests/`:
//! sheet builders, a pinned clock and a deterministic configuration.

use crate::config::SyncConfig;
use crate::models::{RawRow, StoreRef};
use crate::store::InMemoryStore;
use crate::time::{Clock, FixedClock};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

/// Spreadsheet id used by [`seeded_store`]
pub const TEST_SPREADSHEET: &str = "test-calls";

/// Seed used by [`test_config`]
pub const TEST_SEED: u64 = 42;

/// Header used by [`numbered_sheet`]
pub const FULL_HEADER: [&str; 4] = ["Contact", "Status", "Completed By", "Completed At"];

/// 2024-03-09 06:30:00 UTC, which is 12:00:00 at UTC+05:30
pub fn test_instant() -> DateTime<Utc> {
    Utc.timestamp_opt(1_709_965_800, 0)
        .single()
        .unwrap_or_default()
}

/// Clock pinned at [`test_instant`]
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(test_instant()))
}

/// Default configuration with a fixed RNG seed
pub fn test_config() -> SyncConfig {
    let mut config = SyncConfig::default();
    config.environment = "test".to_string();
    config.allocation.seed = Some(TEST_SEED);
    config
}

/// Build rows from string slices
pub fn sheet(rows: &[&[&str]]) -> Vec<RawRow> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Header plus `count` pending contacts `+91000`, `+91001`, ... at rows 2..
pub fn numbered_sheet(count: usize) -> Vec<RawRow> {
    let mut rows = vec![FULL_HEADER.iter().map(|h| h.to_string()).collect::<RawRow>()];
    rows.extend((0..count).map(|i| vec![format!("+91{i:03}"), String::new(), String::new(), String::new()]));
    rows
}

/// In-memory store holding `rows` in the default tab of [`TEST_SPREADSHEET`]
pub fn seeded_store(rows: Vec<RawRow>) -> (Arc<InMemoryStore>, StoreRef) {
    let store = InMemoryStore::new().with_sheet(TEST_SPREADSHEET, "Test call list", "Sheet1", rows);
    (Arc::new(store), StoreRef::spreadsheet(TEST_SPREADSHEET))
}
