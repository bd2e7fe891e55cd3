use super::alias::{AliasTable, CanonicalField};
use crate::error::{SyncError, SyncResult};
use crate::models::RawRow;
use serde::{Deserialize, Serialize};

/// Column positions resolved from one header row.
///
/// Resolved once per read snapshot and reused for every data row of that
/// snapshot, and for positional write-back of completions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    contact: usize,
    status: Option<usize>,
    completed_by: Option<usize>,
    completed_at: Option<usize>,
    /// Trimmed header labels, by column
    labels: Vec<String>,
}

impl ColumnLayout {
    /// Resolve canonical columns from a header row. The first column matching
    /// a field wins. Fails when the header is blank or has no contact column.
    pub fn resolve(header: &RawRow, aliases: &AliasTable) -> SyncResult<Self> {
        let labels: Vec<String> = header.iter().map(|c| c.trim().to_string()).collect();
        if labels.iter().all(|l| l.is_empty()) {
            return Err(SyncError::schema("header row is empty"));
        }

        let mut found: [Option<usize>; 4] = [None; 4];
        for (index, label) in labels.iter().enumerate() {
            if let Some(field) = aliases.resolve(label) {
                let slot = &mut found[field_slot(field)];
                if slot.is_none() {
                    *slot = Some(index);
                }
            }
        }

        let contact = found[field_slot(CanonicalField::Contact)].ok_or_else(|| {
            SyncError::schema(format!(
                "no contact column among headers [{}]",
                labels.join(", ")
            ))
        })?;

        Ok(Self {
            contact,
            status: found[field_slot(CanonicalField::Status)],
            completed_by: found[field_slot(CanonicalField::CompletedBy)],
            completed_at: found[field_slot(CanonicalField::CompletedAt)],
            labels,
        })
    }

    pub fn contact_column(&self) -> usize {
        self.contact
    }

    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        match field {
            CanonicalField::Contact => Some(self.contact),
            CanonicalField::Status => self.status,
            CanonicalField::CompletedBy => self.completed_by,
            CanonicalField::CompletedAt => self.completed_at,
        }
    }

    /// Whether a completion can be recorded at all in this sheet
    pub fn has_completion_columns(&self) -> bool {
        self.status.is_some() || self.completed_by.is_some()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    /// Whether `index` holds a canonical field (as opposed to an extra column)
    pub fn is_canonical(&self, index: usize) -> bool {
        CanonicalField::ALL
            .iter()
            .any(|f| self.column(*f) == Some(index))
    }
}

fn field_slot(field: CanonicalField) -> usize {
    match field {
        CanonicalField::Contact => 0,
        CanonicalField::Status => 1,
        CanonicalField::CompletedBy => 2,
        CanonicalField::CompletedAt => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_resolves_explicit_status_layout() {
        let layout = ColumnLayout::resolve(
            &header(&["Name", " Phone Number", "Status", "Completed By", "Completed At"]),
            AliasTable::standard(),
        )
        .unwrap();
        assert_eq!(layout.column(CanonicalField::Contact), Some(1));
        assert_eq!(layout.column(CanonicalField::Status), Some(2));
        assert_eq!(layout.column(CanonicalField::CompletedBy), Some(3));
        assert_eq!(layout.column(CanonicalField::CompletedAt), Some(4));
        assert!(!layout.is_canonical(0));
        assert_eq!(layout.labels()[1], "Phone Number");
    }

    #[test]
    fn test_resolves_layout_without_status_column() {
        let layout =
            ColumnLayout::resolve(&header(&["Contact", "CompletedBy"]), AliasTable::standard())
                .unwrap();
        assert_eq!(layout.column(CanonicalField::Status), None);
        assert!(layout.has_completion_columns());
    }

    #[test]
    fn test_duplicate_columns_keep_first() {
        let layout = ColumnLayout::resolve(
            &header(&["Phone", "Contact", "Status"]),
            AliasTable::standard(),
        )
        .unwrap();
        assert_eq!(layout.column(CanonicalField::Contact), Some(0));
        assert!(!layout.is_canonical(1));
    }

    #[test]
    fn test_blank_or_contactless_header_is_a_schema_error() {
        let err = ColumnLayout::resolve(&header(&["", "  "]), AliasTable::standard()).unwrap_err();
        assert!(matches!(err, SyncError::Schema { .. }));

        let err = ColumnLayout::resolve(&header(&["Name", "Status"]), AliasTable::standard())
            .unwrap_err();
        assert!(err.to_string().contains("no contact column"));
    }
}
