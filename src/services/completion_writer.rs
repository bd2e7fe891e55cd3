//! # Completion Writer
//!
//! Records a completion against one row of the backing store: status,
//! completer and civil-time timestamp, addressed positionally.
//!
//! There is no compare-and-swap against the previous value. Two completions of
//! the same row both succeed and the last write to land wins.

use crate::constants::sheet;
use crate::error::{SyncError, SyncResult};
use crate::models::{RowAddress, StoreRef};
use crate::schema::{AliasTable, CanonicalField, ColumnLayout};
use crate::store::{CellWrite, RowRange, StoreGateway};
use crate::time::{CivilTimeFormat, Clock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Acknowledgement of a durable completion write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReceipt {
    pub row_address: RowAddress,
    pub completed_by: String,
    /// Timestamp exactly as written to the store
    pub completed_at: String,
}

#[derive(Debug, Clone)]
pub struct CompletionWriter {
    time_format: CivilTimeFormat,
    completed_label: String,
    clock: Arc<dyn Clock>,
}

impl CompletionWriter {
    pub fn new(
        time_format: CivilTimeFormat,
        completed_label: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            time_format,
            completed_label: completed_label.into(),
            clock,
        }
    }

    pub fn time_format(&self) -> &CivilTimeFormat {
        &self.time_format
    }

    /// Trimmed completer identity, rejecting blanks
    pub fn validate_identity(completed_by: &str) -> SyncResult<String> {
        let trimmed = completed_by.trim();
        if trimmed.is_empty() {
            return Err(SyncError::validation("completedBy must not be empty"));
        }
        Ok(trimmed.to_string())
    }

    fn validate_address(row_address: RowAddress) -> SyncResult<()> {
        if !row_address.is_data_row() {
            return Err(SyncError::not_found(format!(
                "{row_address} is not a data row (data starts at row {})",
                sheet::FIRST_DATA_ROW
            )));
        }
        Ok(())
    }

    /// Cells that record a completion under `layout`
    pub fn plan(
        &self,
        layout: &ColumnLayout,
        row_address: RowAddress,
        completed_by: &str,
        completed_at: &str,
    ) -> SyncResult<Vec<CellWrite>> {
        if !layout.has_completion_columns() {
            return Err(SyncError::schema(
                "sheet has neither a status nor a completed-by column",
            ));
        }
        let mut cells = Vec::with_capacity(3);
        if let Some(column) = layout.column(CanonicalField::Status) {
            cells.push(CellWrite::new(row_address, column, self.completed_label.clone()));
        }
        if let Some(column) = layout.column(CanonicalField::CompletedBy) {
            cells.push(CellWrite::new(row_address, column, completed_by));
        }
        if let Some(column) = layout.column(CanonicalField::CompletedAt) {
            cells.push(CellWrite::new(row_address, column, completed_at));
        }
        Ok(cells)
    }

    /// Stateless completion: validate, confirm the row exists with one batched
    /// read of the header and the target row, then write.
    pub async fn complete(
        &self,
        gateway: &StoreGateway,
        store_ref: &StoreRef,
        row_address: RowAddress,
        completed_by: &str,
    ) -> SyncResult<CompletionReceipt> {
        let identity = Self::validate_identity(completed_by)?;
        Self::validate_address(row_address)?;

        let mut ranges = gateway
            .read_ranges(store_ref, &[RowRange::header(), RowRange::single(row_address)])
            .await?
            .into_iter();
        let header = ranges.next().and_then(|rows| rows.into_iter().next());
        let target = ranges.next().unwrap_or_default();

        let header = header.ok_or_else(|| SyncError::schema("sheet has no header row"))?;
        if target.is_empty() {
            return Err(SyncError::not_found(format!(
                "{row_address} of {store_ref} does not exist"
            )));
        }
        let layout = ColumnLayout::resolve(&header, AliasTable::standard())?;

        self.write_completion(gateway, store_ref, &layout, row_address, &identity)
            .await
    }

    /// Write a completion using a layout from an earlier read of the same
    /// sheet. The store rejects rows that no longer exist.
    pub async fn write_completion(
        &self,
        gateway: &StoreGateway,
        store_ref: &StoreRef,
        layout: &ColumnLayout,
        row_address: RowAddress,
        completed_by: &str,
    ) -> SyncResult<CompletionReceipt> {
        let identity = Self::validate_identity(completed_by)?;
        Self::validate_address(row_address)?;

        let completed_at = self.time_format.format(self.clock.now());
        let cells = self.plan(layout, row_address, &identity, &completed_at)?;

        if gateway.capabilities().atomic_batch_writes {
            gateway.write_cells(store_ref, &cells).await?;
        } else {
            for (applied, cell) in cells.iter().enumerate() {
                debug!(store = %store_ref, cell = %cell.a1(&store_ref.sheet), "Writing completion cell");
                if let Err(err) = gateway.write_cell(store_ref, cell).await {
                    return Err(partial_write(err, applied, cells.len()));
                }
            }
        }

        info!(
            store = %store_ref,
            row = row_address.row(),
            completed_by = %identity,
            completed_at = %completed_at,
            cells = cells.len(),
            "Recorded contact completion"
        );

        Ok(CompletionReceipt {
            row_address,
            completed_by: identity,
            completed_at,
        })
    }
}

/// Annotate a failure from a cell-by-cell write with how far it got. Any
/// failure after the first cell leaves the row partially written, which is
/// still reported as a failure so the caller retries the whole completion.
fn partial_write(err: SyncError, applied: usize, total: usize) -> SyncError {
    if applied == 0 {
        return err;
    }
    let note = format!("partial write, {applied} of {total} cells applied");
    match err {
        SyncError::TransientStore { operation, message } => SyncError::TransientStore {
            operation,
            message: format!("{message} ({note})"),
        },
        SyncError::Permission { operation, message } => SyncError::Permission {
            operation,
            message: format!("{message} ({note})"),
        },
        SyncError::NotFound { resource } => SyncError::NotFound {
            resource: format!("{resource} ({note})"),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::models::RawRow;
    use crate::store::InMemoryStore;
    use crate::time::FixedClock;
    use chrono::{TimeZone, Utc};

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn writer() -> CompletionWriter {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 9, 6, 30, 0).unwrap());
        CompletionWriter::new(CivilTimeFormat::default(), "Completed", Arc::new(clock))
    }

    fn fixture(header: &[&str]) -> (Arc<InMemoryStore>, StoreGateway, StoreRef) {
        let store = Arc::new(InMemoryStore::new().with_sheet(
            "calls",
            "Calls",
            "Sheet1",
            vec![row(header), row(&["+91111"]), row(&["+91222"])],
        ));
        let gateway = StoreGateway::new(store.clone(), None);
        (store, gateway, StoreRef::spreadsheet("calls"))
    }

    #[test]
    fn test_blank_identity_is_rejected() {
        assert!(matches!(
            CompletionWriter::validate_identity("   "),
            Err(SyncError::Validation(_))
        ));
        assert_eq!(CompletionWriter::validate_identity(" Asha ").unwrap(), "Asha");
    }

    #[test]
    fn test_plan_covers_present_completion_columns() {
        let layout = ColumnLayout::resolve(
            &row(&["Contact", "Status", "Completed By", "Completed At"]),
            AliasTable::standard(),
        )
        .unwrap();
        let cells = writer()
            .plan(&layout, RowAddress::new(4), "Asha", "09/03/2024 12:00:00")
            .unwrap();
        let columns: Vec<usize> = cells.iter().map(|c| c.column).collect();
        assert_eq!(columns, vec![1, 2, 3]);
        assert_eq!(cells[0].value, "Completed");

        let bare = ColumnLayout::resolve(&row(&["Contact", "Notes"]), AliasTable::standard()).unwrap();
        assert!(matches!(
            writer().plan(&bare, RowAddress::new(4), "Asha", "now"),
            Err(SyncError::Schema { .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_writes_all_cells_in_civil_time() {
        let (store, gateway, store_ref) = fixture(&["Contact", "Status", "CompletedBy", "CompletedAt"]);
        let receipt = writer()
            .complete(&gateway, &store_ref, RowAddress::new(3), "Asha")
            .await
            .unwrap();

        assert_eq!(receipt.completed_at, "09/03/2024 12:00:00");
        let written = store.rows(&store_ref).unwrap()[2].clone();
        assert_eq!(written, row(&["+91222", "Completed", "Asha", "09/03/2024 12:00:00"]));
        assert_eq!(store.request_counts().writes, 1);
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let (store, gateway, store_ref) = fixture(&["Contact", "CompletedBy"]);
        let err = writer()
            .complete(&gateway, &store_ref, RowAddress::new(12), "Asha")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(store.request_counts().writes, 0);

        let err = writer()
            .complete(&gateway, &store_ref, RowAddress::new(1), "Asha")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_denied_write_is_permission_error() {
        let (store, gateway, store_ref) = fixture(&["Contact", "CompletedBy"]);
        store.deny_writes(true);
        let err = writer()
            .complete(&gateway, &store_ref, RowAddress::new(2), "Asha")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Permission);
    }

    #[tokio::test]
    async fn test_partial_cell_by_cell_write_is_surfaced() {
        let (store, gateway, store_ref) = fixture(&["Contact", "Status", "CompletedBy", "CompletedAt"]);
        store.set_atomic_batch_writes(false);
        store.fail_cell_writes_after(2);

        let err = writer()
            .complete(&gateway, &store_ref, RowAddress::new(2), "Asha")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("2 of 3 cells applied"));

        store.clear_cell_write_budget();
        writer()
            .complete(&gateway, &store_ref, RowAddress::new(2), "Asha")
            .await
            .unwrap();
        assert_eq!(store.cell(&store_ref, 2, 3).as_deref(), Some("09/03/2024 12:00:00"));
    }
}
