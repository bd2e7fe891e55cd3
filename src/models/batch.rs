use super::contact::{ContactRecord, RowAddress};
use serde::{Deserialize, Serialize};

/// Ordered snapshot of contacts assigned at one allocation point.
///
/// A batch owns its records; later writes to the store do not change a batch
/// that has already been issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Batch {
    /// 1-based position of this batch within its session (0 for one-shot listings)
    pub sequence: u32,
    records: Vec<ContactRecord>,
}

impl Batch {
    pub fn new(sequence: u32, records: Vec<ContactRecord>) -> Self {
        Self { sequence, records }
    }

    pub fn empty(sequence: u32) -> Self {
        Self::new(sequence, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactRecord> {
        self.records.iter()
    }

    pub fn contains(&self, row_address: RowAddress) -> bool {
        self.records.iter().any(|r| r.row_address == row_address)
    }

    pub fn get(&self, row_address: RowAddress) -> Option<&ContactRecord> {
        self.records.iter().find(|r| r.row_address == row_address)
    }

    pub fn row_addresses(&self) -> Vec<RowAddress> {
        self.records.iter().map(|r| r.row_address).collect()
    }

    /// Remove a record from this view, returning it if present
    pub(crate) fn remove(&mut self, row_address: RowAddress) -> Option<ContactRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.row_address == row_address)?;
        Some(self.records.remove(index))
    }

    pub fn into_records(self) -> Vec<ContactRecord> {
        self.records
    }
}

impl IntoIterator for Batch {
    type Item = ContactRecord;
    type IntoIter = std::vec::IntoIter<ContactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
