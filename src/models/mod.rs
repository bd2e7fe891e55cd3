//! # Data Models
//!
//! Canonical value types shared by every component: the normalized contact
//! record, its positional address in the backing store, the batches handed to
//! callers, and the reference naming which store to talk to.

pub mod batch;
pub mod contact;
pub mod store_ref;

pub use batch::Batch;
pub use contact::{ContactRecord, ContactStatus, RawRow, RowAddress, RowKey};
pub use store_ref::StoreRef;
