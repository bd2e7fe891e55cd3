#![allow(dead_code)]

pub mod strategies;

use callsheet_core::models::{RawRow, StoreRef};
use callsheet_core::store::InMemoryStore;
use callsheet_core::test_utils::{fixed_clock, seeded_store, test_config};
use callsheet_core::{ContactSyncService, SyncConfig};
use std::sync::Arc;

pub use callsheet_core::test_utils::{numbered_sheet, sheet};

/// Service over an in-memory store holding `rows`
pub fn service_with(rows: Vec<RawRow>) -> (Arc<InMemoryStore>, StoreRef, ContactSyncService) {
    service_with_config(rows, test_config())
}

pub fn service_with_config(
    rows: Vec<RawRow>,
    config: SyncConfig,
) -> (Arc<InMemoryStore>, StoreRef, ContactSyncService) {
    let (store, store_ref) = seeded_store(rows);
    let service = ContactSyncService::new(store.clone(), config, fixed_clock())
        .expect("test configuration is valid");
    (store, store_ref, service)
}

/// Config with the given session batch width
pub fn config_with_batch_size(batch_size: usize) -> SyncConfig {
    let mut config = test_config();
    config.allocation.batch_size = batch_size;
    config
}
