//! # Pending-Set Filter
//!
//! Derives the contacts eligible for assignment from a normalized snapshot and
//! reports which of the distinct "nothing to hand out" conditions applies.

use crate::constants::StoreCondition;
use crate::error::SyncResult;
use crate::models::{ContactRecord, RawRow};
use crate::schema::{ColumnLayout, SchemaNormalizer};

/// Order-preserving sub-sequence of `records` that are assignable: non-empty
/// identifier and not completed. Side-effect free.
pub fn filter_pending(records: &[ContactRecord]) -> Vec<ContactRecord> {
    records
        .iter()
        .filter(|r| r.is_assignable())
        .cloned()
        .collect()
}

/// Outcome of assessing one full read of a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSet {
    pub condition: StoreCondition,
    /// `None` only when the sheet had no rows at all
    pub layout: Option<ColumnLayout>,
    /// Data rows with at least one non-blank cell
    pub data_rows: usize,
    pub completed_rows: usize,
    /// Assignable records in sheet order
    pub records: Vec<ContactRecord>,
}

impl PendingSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PendingSetFilter;

impl PendingSetFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn filter(&self, records: &[ContactRecord]) -> Vec<ContactRecord> {
        filter_pending(records)
    }

    /// Normalize a full sheet read (header first) and derive its pending set.
    ///
    /// A sheet with zero rows is reported as [`StoreCondition::NoRows`] rather
    /// than an error; only a present-but-unusable header fails.
    pub fn assess(&self, normalizer: &SchemaNormalizer, sheet_rows: &[RawRow]) -> SyncResult<PendingSet> {
        if sheet_rows.is_empty() {
            return Ok(PendingSet {
                condition: StoreCondition::NoRows,
                layout: None,
                data_rows: 0,
                completed_rows: 0,
                records: Vec::new(),
            });
        }

        let sheet = normalizer.normalize_sheet(sheet_rows)?;
        let data_rows = sheet_rows[1..]
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .count();
        let completed_rows = sheet
            .records
            .iter()
            .filter(|r| r.status.is_completed())
            .count();
        let records = filter_pending(&sheet.records);

        let condition = if data_rows == 0 {
            StoreCondition::HeadersOnly
        } else if records.is_empty() {
            StoreCondition::NothingPending
        } else {
            StoreCondition::Available
        };

        Ok(PendingSet {
            condition,
            layout: Some(sheet.layout),
            data_rows,
            completed_rows,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactStatus, RowAddress};

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_filter_preserves_order_and_drops_ineligible() {
        let mut completed = ContactRecord::pending("+91222", RowAddress::new(3));
        completed.status = ContactStatus::Completed;
        let records = vec![
            ContactRecord::pending("+91111", RowAddress::new(2)),
            completed,
            ContactRecord::pending("  ", RowAddress::new(4)),
            ContactRecord::pending("+91444", RowAddress::new(5)),
        ];

        let pending = filter_pending(&records);
        let addresses: Vec<u32> = pending.iter().map(|r| r.row_address.row()).collect();
        assert_eq!(addresses, vec![2, 5]);
    }

    #[test]
    fn test_filter_is_empty_not_an_error_when_nothing_qualifies() {
        assert!(filter_pending(&[]).is_empty());
    }

    #[test]
    fn test_assess_distinguishes_empty_sheet_conditions() {
        let normalizer = SchemaNormalizer::default();
        let filter = PendingSetFilter::new();

        let none = filter.assess(&normalizer, &[]).unwrap();
        assert_eq!(none.condition, StoreCondition::NoRows);
        assert!(none.layout.is_none());

        let headers = filter
            .assess(&normalizer, &[row(&["Contact", "CompletedBy"]), row(&["", " "])])
            .unwrap();
        assert_eq!(headers.condition, StoreCondition::HeadersOnly);
        assert_eq!(headers.data_rows, 0);

        let done = filter
            .assess(
                &normalizer,
                &[row(&["Contact", "CompletedBy"]), row(&["+91222", "Raj"])],
            )
            .unwrap();
        assert_eq!(done.condition, StoreCondition::NothingPending);
        assert_eq!(done.completed_rows, 1);

        let available = filter
            .assess(
                &normalizer,
                &[row(&["Contact", "CompletedBy"]), row(&["+91111", ""]), row(&["+91222", "Raj"])],
            )
            .unwrap();
        assert_eq!(available.condition, StoreCondition::Available);
        assert_eq!(available.records.len(), 1);
        assert_eq!(available.records[0].row_address, RowAddress::new(2));
    }
}
