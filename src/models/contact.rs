use crate::constants::sheet;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One row of cells as returned by the backing store. A header row is a
/// `RawRow` whose cells are column labels.
pub type RawRow = Vec<String>;

/// Completion state of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    Pending,
    Completed,
}

impl ContactStatus {
    /// Interpret a raw status cell. Anything not recognised as a completion
    /// marker is treated as pending.
    pub fn from_cell(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" | "called" => Self::Completed,
            _ => Self::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// 1-based row number of a record in the backing sheet.
///
/// Assigned from the row's position at read time and never recomputed from
/// content. Unique within one read snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowAddress(u32);

impl RowAddress {
    pub fn new(row: u32) -> Self {
        Self(row)
    }

    /// Address of the `index`-th data row (0-based) below the header
    pub fn from_data_index(index: usize) -> Self {
        Self(sheet::FIRST_DATA_ROW + index as u32)
    }

    pub fn row(&self) -> u32 {
        self.0
    }

    /// Header and anything above it are never valid completion targets
    pub fn is_data_row(&self) -> bool {
        self.0 >= sheet::FIRST_DATA_ROW
    }
}

impl fmt::Display for RowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

impl From<u32> for RowAddress {
    fn from(row: u32) -> Self {
        Self(row)
    }
}

/// Identity of a record across snapshots: its position plus the identifier
/// found there. A row whose identifier changed between reads is a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub row_address: RowAddress,
    pub identifier: String,
}

/// Canonical contact record produced by the schema normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Phone number or handle, trimmed. Empty means the row is not assignable.
    pub identifier: String,
    pub status: ContactStatus,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// The completion timestamp cell exactly as stored, when non-empty
    pub completed_at_raw: Option<String>,
    pub row_address: RowAddress,
    /// Columns with no canonical meaning, keyed by their trimmed header label
    pub extra: BTreeMap<String, String>,
}

impl ContactRecord {
    /// Minimal pending record, mostly useful for fixtures
    pub fn pending(identifier: impl Into<String>, row_address: RowAddress) -> Self {
        Self {
            identifier: identifier.into(),
            status: ContactStatus::Pending,
            completed_by: None,
            completed_at: None,
            completed_at_raw: None,
            row_address,
            extra: BTreeMap::new(),
        }
    }

    pub fn has_identifier(&self) -> bool {
        !self.identifier.trim().is_empty()
    }

    /// Eligible for assignment: has an identifier and is not completed
    pub fn is_assignable(&self) -> bool {
        self.has_identifier() && self.status == ContactStatus::Pending
    }

    pub fn key(&self) -> RowKey {
        RowKey {
            row_address: self.row_address,
            identifier: self.identifier.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_cell_parsing() {
        assert_eq!(ContactStatus::from_cell("Completed"), ContactStatus::Completed);
        assert_eq!(ContactStatus::from_cell("  DONE "), ContactStatus::Completed);
        assert_eq!(ContactStatus::from_cell("called"), ContactStatus::Completed);
        assert_eq!(ContactStatus::from_cell(""), ContactStatus::Pending);
        assert_eq!(ContactStatus::from_cell("pending"), ContactStatus::Pending);
        assert_eq!(ContactStatus::from_cell("no answer"), ContactStatus::Pending);
    }

    #[test]
    fn test_row_address_from_data_index() {
        assert_eq!(RowAddress::from_data_index(0), RowAddress::new(2));
        assert_eq!(RowAddress::from_data_index(9).row(), 11);
        assert!(RowAddress::new(2).is_data_row());
        assert!(!RowAddress::new(1).is_data_row());
        assert!(!RowAddress::new(0).is_data_row());
    }

    #[test]
    fn test_assignability() {
        let mut record = ContactRecord::pending("+91111", RowAddress::new(2));
        assert!(record.is_assignable());

        record.identifier = "   ".to_string();
        assert!(!record.is_assignable());

        record.identifier = "+91111".to_string();
        record.status = ContactStatus::Completed;
        assert!(!record.is_assignable());
    }

    #[test]
    fn test_row_address_serializes_as_number() {
        let json = serde_json::to_string(&RowAddress::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
