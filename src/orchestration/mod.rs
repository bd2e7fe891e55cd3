//! # Session Orchestration
//!
//! Composes normalization, filtering, allocation and completion into the
//! external request/response contract:
//!
//! - [`ContactSyncService::list_pending`]: fresh randomized batch with the
//!   store condition
//! - [`ContactSyncService::complete_contact`]: durable completion write
//! - [`ContactSyncService::probe_store`]: read-only schema check
//! - [`ContactSyncService::start_session`]: a stateful [`CallingSession`]
//!   that serves non-overlapping batches to one caller
//!
//! Every operation is request-driven with a single suspend point on the
//! backing store. Sessions share no coordination primitive: two callers can
//! complete the same row and the last write wins.

pub mod service;
pub mod session;
pub mod types;

pub use service::ContactSyncService;
pub use session::CallingSession;
pub use types::{PendingListing, StoreProbe};
