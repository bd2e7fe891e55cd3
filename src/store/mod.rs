//! # Backing Store Boundary
//!
//! The tabular store (a spreadsheet service, or anything that behaves like
//! one) is a black-box key-range read/write API. Backends implement
//! [`TabularStore`] and report raw [`StoreFailure`]s; the [`StoreGateway`]
//! classifies those into the crate's error taxonomy and applies the optional
//! request timeout, so no other component ever sees an unclassified failure.

pub mod classifier;
pub mod gateway;
pub mod memory;
pub mod range;

use crate::models::{RawRow, RowAddress, StoreRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use classifier::StoreFailureClassifier;
pub use gateway::StoreGateway;
pub use memory::InMemoryStore;
pub use range::{column_letters, RowRange};

/// Raw failure reported by a backend, before classification.
///
/// `status` follows HTTP semantics as returned by spreadsheet APIs; `None`
/// means the request never produced a response (connection reset, DNS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store request failed (status {status:?}): {message}")]
pub struct StoreFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl StoreFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Some(404), message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Some(403), message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Some(400), message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(Some(429), message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Some(503), message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

pub type StoreResult<T> = Result<T, StoreFailure>;

/// Spreadsheet-level metadata returned by [`TabularStore::describe`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub title: String,
    pub sheet_titles: Vec<String>,
}

/// One cell to write. `column` is 0-based; `row` is the record's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWrite {
    pub row: RowAddress,
    pub column: usize,
    pub value: String,
}

impl CellWrite {
    pub fn new(row: RowAddress, column: usize, value: impl Into<String>) -> Self {
        Self {
            row,
            column,
            value: value.into(),
        }
    }

    /// A1 notation for this cell, e.g. `Sheet1!C5`
    pub fn a1(&self, sheet: &str) -> String {
        format!(
            "{}!{}{}",
            range::quote_sheet_name(sheet),
            column_letters(self.column),
            self.row.row()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCapabilities {
    /// Whether [`TabularStore::write_cells`] applies all cells or none
    pub atomic_batch_writes: bool,
}

impl Default for StoreCapabilities {
    fn default() -> Self {
        Self {
            atomic_batch_writes: true,
        }
    }
}

/// Key-range read/write access to a tabular backing store.
///
/// Contract for implementors:
/// - `read_ranges` returns one entry per requested range, each holding the
///   rows inside the sheet's data extent (rows past the last used row are
///   simply absent).
/// - Writes addressed to a spreadsheet, sheet or row that does not exist fail
///   with status 404 rather than extending the sheet.
#[async_trait]
pub trait TabularStore: Send + Sync + std::fmt::Debug {
    async fn describe(&self, store: &StoreRef) -> StoreResult<StoreMetadata>;

    async fn read_ranges(
        &self,
        store: &StoreRef,
        ranges: &[RowRange],
    ) -> StoreResult<Vec<Vec<RawRow>>>;

    /// Write every cell in one request
    async fn write_cells(&self, store: &StoreRef, cells: &[CellWrite]) -> StoreResult<()>;

    async fn write_cell(&self, store: &StoreRef, cell: &CellWrite) -> StoreResult<()> {
        self.write_cells(store, std::slice::from_ref(cell)).await
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::default()
    }
}
