#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Callsheet Core
//!
//! Contact assignment and completion sync over a shared spreadsheet.
//!
//! ## Overview
//!
//! A team of callers works through one list of contacts held in a tabular
//! store. This crate reads the sheet whatever its header spelling, hands each
//! caller randomized batches of contacts that are still open, and writes
//! completions back to the exact row they came from.
//!
//! ## Module Organization
//!
//! - [`schema`] - Header aliasing and normalization into [`models::ContactRecord`]
//! - [`services`] - Pending-set filter, batch allocator, completion writer
//! - [`state_machine`] - Calling-session states and transitions
//! - [`orchestration`] - [`ContactSyncService`] and [`CallingSession`]
//! - [`store`] - The [`store::TabularStore`] boundary, failure classification,
//!   and an in-memory backend
//! - [`config`] - Layered configuration
//! - [`error`] - Classified error taxonomy
//! - [`logging`] - Tracing setup and the [`log_sync!`] macro
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use callsheet_core::config::SyncConfig;
//! use callsheet_core::models::StoreRef;
//! use callsheet_core::store::InMemoryStore;
//! use callsheet_core::time::SystemClock;
//! use callsheet_core::ContactSyncService;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), callsheet_core::SyncError> {
//! let store = Arc::new(InMemoryStore::new());
//! let service = ContactSyncService::new(store, SyncConfig::default(), Arc::new(SystemClock))?;
//!
//! let sheet = StoreRef::spreadsheet("1AbC");
//! let mut session = service.start_session(&sheet)?;
//! let batch = session.load_first_batch("Asha").await?.row_addresses();
//! for row in batch {
//!     session.complete_one(row).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Sessions share no lock, lease or version check. Two callers completing
//! the same row both succeed and the last write to land is what the sheet
//! keeps.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod schema;
pub mod services;
pub mod state_machine;
pub mod store;
pub mod test_utils;
pub mod time;

pub use config::{ConfigManager, SyncConfig};
pub use constants::{StoreCondition, SessionStatus};
pub use error::{ErrorCategory, SyncError, SyncResult};
pub use models::{Batch, ContactRecord, ContactStatus, RowAddress, StoreRef};
pub use orchestration::{CallingSession, ContactSyncService, PendingListing, StoreProbe};
pub use services::{AllocationPolicy, CompletionReceipt};
pub use store::{InMemoryStore, StoreFailure, TabularStore};
