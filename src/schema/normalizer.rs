use super::alias::{AliasTable, CanonicalField};
use super::layout::ColumnLayout;
use crate::error::{SyncError, SyncResult};
use crate::models::{ContactRecord, ContactStatus, RawRow, RowAddress};
use crate::time::CivilTimeFormat;
use std::collections::BTreeMap;

/// Header layout plus the records read under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSheet {
    pub layout: ColumnLayout,
    pub records: Vec<ContactRecord>,
}

/// Maps raw tabular rows into canonical contact records.
///
/// Pure and deterministic: normalizing the same rows twice yields identical
/// records. Never fails for missing data, only for a missing or unusable
/// header row.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    aliases: &'static AliasTable,
    time_format: CivilTimeFormat,
}

impl SchemaNormalizer {
    pub fn new(aliases: &'static AliasTable, time_format: CivilTimeFormat) -> Self {
        Self {
            aliases,
            time_format,
        }
    }

    pub fn aliases(&self) -> &'static AliasTable {
        self.aliases
    }

    /// Normalize data rows under `header`. Rows are addressed by position:
    /// the first data row is row 2 of the sheet.
    pub fn normalize(
        &self,
        header: Option<&RawRow>,
        rows: &[RawRow],
    ) -> SyncResult<Vec<ContactRecord>> {
        let header = header.ok_or_else(|| SyncError::schema("sheet has no header row"))?;
        let layout = ColumnLayout::resolve(header, self.aliases)?;
        Ok(self.records_under(&layout, rows))
    }

    /// Normalize a full sheet read whose first row is the header
    pub fn normalize_sheet(&self, sheet_rows: &[RawRow]) -> SyncResult<NormalizedSheet> {
        let (header, data) = sheet_rows
            .split_first()
            .ok_or_else(|| SyncError::schema("sheet has no header row"))?;
        let layout = ColumnLayout::resolve(header, self.aliases)?;
        let records = self.records_under(&layout, data);
        Ok(NormalizedSheet { layout, records })
    }

    pub fn records_under(&self, layout: &ColumnLayout, rows: &[RawRow]) -> Vec<ContactRecord> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.record(layout, row, RowAddress::from_data_index(index)))
            .collect()
    }

    /// Build one record. Short rows read as empty cells.
    pub fn record(&self, layout: &ColumnLayout, row: &RawRow, row_address: RowAddress) -> ContactRecord {
        let identifier = cell(row, Some(layout.contact_column()));
        let status_cell = cell(row, layout.column(CanonicalField::Status));
        let completed_by = non_empty(cell(row, layout.column(CanonicalField::CompletedBy)));
        let completed_at_raw = non_empty(cell(row, layout.column(CanonicalField::CompletedAt)));

        // Sheets without a status column mark completion only through the
        // completed-by cell; a filled completed-by always means completed.
        let status = if completed_by.is_some() {
            ContactStatus::Completed
        } else {
            ContactStatus::from_cell(status_cell)
        };

        let completed_at = completed_at_raw
            .as_deref()
            .and_then(|raw| self.time_format.parse(raw));

        let mut extra = BTreeMap::new();
        for (index, label) in layout.labels().iter().enumerate() {
            if label.is_empty() || layout.is_canonical(index) {
                continue;
            }
            let value = row.get(index).cloned().unwrap_or_default();
            extra.entry(label.clone()).or_insert(value);
        }

        ContactRecord {
            identifier: identifier.to_string(),
            status,
            completed_by,
            completed_at,
            completed_at_raw,
            row_address,
            extra,
        }
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(AliasTable::standard(), CivilTimeFormat::default())
    }
}

fn cell(row: &RawRow, index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(|c| c.trim())
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
