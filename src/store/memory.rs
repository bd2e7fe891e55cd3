//! # In-Memory Tabular Store
//!
//! A complete [`TabularStore`] backend holding spreadsheets in process memory.
//! It mirrors the observable behaviour of a hosted spreadsheet API closely
//! enough to exercise every classified failure path: unknown spreadsheets are
//! 404s, unknown tabs are 400 "Unable to parse range", denied writes are 403s.
//! Faults can be injected for reads and writes.

use super::{
    CellWrite, RowRange, StoreCapabilities, StoreFailure, StoreMetadata, StoreResult, TabularStore,
};
use crate::models::{RawRow, StoreRef};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    spreadsheets: HashMap<String, Spreadsheet>,
    atomic_batch_writes: bool,
    deny_writes: bool,
    next_read_failure: Option<StoreFailure>,
    next_write_failure: Option<StoreFailure>,
    /// Remaining single-cell writes before the store starts failing them
    cell_write_budget: Option<usize>,
    requests: RequestCounts,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            spreadsheets: HashMap::new(),
            atomic_batch_writes: true,
            deny_writes: false,
            next_read_failure: None,
            next_write_failure: None,
            cell_write_budget: None,
            requests: RequestCounts::default(),
        }
    }
}

#[derive(Debug, Default)]
struct Spreadsheet {
    title: String,
    /// Tabs in creation order
    sheets: Vec<(String, Vec<RawRow>)>,
}

impl Spreadsheet {
    fn sheet(&self, name: &str) -> Option<&Vec<RawRow>> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, rows)| rows)
    }

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Vec<RawRow>> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows)
    }
}

/// Number of requests the store has served, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub describes: usize,
    pub reads: usize,
    pub writes: usize,
}

impl RequestCounts {
    pub fn total(&self) -> usize {
        self.describes + self.reads + self.writes
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`InMemoryStore::put_sheet`]
    pub fn with_sheet(
        self,
        spreadsheet_id: &str,
        title: &str,
        sheet: &str,
        rows: Vec<RawRow>,
    ) -> Self {
        self.put_sheet(spreadsheet_id, title, sheet, rows);
        self
    }

    /// Create or replace a tab, creating the spreadsheet if needed
    pub fn put_sheet(&self, spreadsheet_id: &str, title: &str, sheet: &str, rows: Vec<RawRow>) {
        let mut state = self.state.write();
        let spreadsheet = state
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default();
        spreadsheet.title = title.to_string();
        match spreadsheet.sheet_mut(sheet) {
            Some(existing) => *existing = rows,
            None => spreadsheet.sheets.push((sheet.to_string(), rows)),
        }
    }

    /// Append a data row to an existing tab
    pub fn append_row(&self, store: &StoreRef, row: RawRow) -> bool {
        let mut state = self.state.write();
        match state
            .spreadsheets
            .get_mut(&store.spreadsheet_id)
            .and_then(|s| s.sheet_mut(&store.sheet))
        {
            Some(rows) => {
                rows.push(row);
                true
            }
            None => false,
        }
    }

    /// Copy of every row in a tab
    pub fn rows(&self, store: &StoreRef) -> Option<Vec<RawRow>> {
        let state = self.state.read();
        state
            .spreadsheets
            .get(&store.spreadsheet_id)
            .and_then(|s| s.sheet(&store.sheet))
            .cloned()
    }

    /// Value of one cell; `row` is 1-based and `column` 0-based
    pub fn cell(&self, store: &StoreRef, row: u32, column: usize) -> Option<String> {
        let rows = self.rows(store)?;
        let index = (row as usize).checked_sub(1)?;
        rows.get(index)?.get(column).cloned()
    }

    pub fn set_atomic_batch_writes(&self, enabled: bool) {
        self.state.write().atomic_batch_writes = enabled;
    }

    pub fn deny_writes(&self, deny: bool) {
        self.state.write().deny_writes = deny;
    }

    pub fn fail_next_read(&self, failure: StoreFailure) {
        self.state.write().next_read_failure = Some(failure);
    }

    pub fn fail_next_write(&self, failure: StoreFailure) {
        self.state.write().next_write_failure = Some(failure);
    }

    /// Allow `cells` more single-cell writes, then fail every further one
    /// with a 503 until [`InMemoryStore::clear_cell_write_budget`]
    pub fn fail_cell_writes_after(&self, cells: usize) {
        self.state.write().cell_write_budget = Some(cells);
    }

    pub fn clear_cell_write_budget(&self) {
        self.state.write().cell_write_budget = None;
    }

    pub fn request_counts(&self) -> RequestCounts {
        self.state.read().requests
    }
}

impl StoreState {
    fn sheet(&self, store: &StoreRef) -> StoreResult<&Vec<RawRow>> {
        let spreadsheet = self.spreadsheets.get(&store.spreadsheet_id).ok_or_else(|| {
            StoreFailure::not_found("Requested entity was not found.")
        })?;
        spreadsheet.sheet(&store.sheet).ok_or_else(|| {
            StoreFailure::bad_request(format!(
                "Unable to parse range: {}",
                RowRange::all().to_a1(&store.sheet)
            ))
        })
    }

    fn sheet_mut(&mut self, store: &StoreRef) -> StoreResult<&mut Vec<RawRow>> {
        let spreadsheet = self
            .spreadsheets
            .get_mut(&store.spreadsheet_id)
            .ok_or_else(|| StoreFailure::not_found("Requested entity was not found."))?;
        spreadsheet.sheet_mut(&store.sheet).ok_or_else(|| {
            StoreFailure::bad_request(format!(
                "Unable to parse range: {}",
                RowRange::all().to_a1(&store.sheet)
            ))
        })
    }

    fn check_writable(&mut self) -> StoreResult<()> {
        if let Some(failure) = self.next_write_failure.take() {
            return Err(failure);
        }
        if self.deny_writes {
            return Err(StoreFailure::forbidden(
                "The caller does not have permission",
            ));
        }
        Ok(())
    }

    fn check_targets(&self, store: &StoreRef, cells: &[CellWrite]) -> StoreResult<()> {
        let rows = self.sheet(store)?;
        for cell in cells {
            let row = cell.row.row() as usize;
            if row == 0 || row > rows.len() {
                return Err(StoreFailure::not_found(format!(
                    "Row {} of {} does not exist",
                    cell.row.row(),
                    store.sheet
                )));
            }
        }
        Ok(())
    }
}

fn apply_cell(rows: &mut [RawRow], cell: &CellWrite) {
    if let Some(row) = rows.get_mut(cell.row.row() as usize - 1) {
        if row.len() <= cell.column {
            row.resize(cell.column + 1, String::new());
        }
        row[cell.column] = cell.value.clone();
    }
}

#[async_trait]
impl TabularStore for InMemoryStore {
    async fn describe(&self, store: &StoreRef) -> StoreResult<StoreMetadata> {
        let mut state = self.state.write();
        state.requests.describes += 1;
        if let Some(failure) = state.next_read_failure.take() {
            return Err(failure);
        }
        let spreadsheet = state
            .spreadsheets
            .get(&store.spreadsheet_id)
            .ok_or_else(|| StoreFailure::not_found("Requested entity was not found."))?;
        Ok(StoreMetadata {
            title: spreadsheet.title.clone(),
            sheet_titles: spreadsheet.sheets.iter().map(|(n, _)| n.clone()).collect(),
        })
    }

    async fn read_ranges(
        &self,
        store: &StoreRef,
        ranges: &[RowRange],
    ) -> StoreResult<Vec<Vec<RawRow>>> {
        let mut state = self.state.write();
        state.requests.reads += 1;
        if let Some(failure) = state.next_read_failure.take() {
            return Err(failure);
        }
        let rows = state.sheet(store)?;
        Ok(ranges
            .iter()
            .map(|range| {
                rows.iter()
                    .enumerate()
                    .filter(|(i, _)| range.contains(*i as u32 + 1))
                    .map(|(_, row)| row.clone())
                    .collect()
            })
            .collect())
    }

    async fn write_cells(&self, store: &StoreRef, cells: &[CellWrite]) -> StoreResult<()> {
        let mut state = self.state.write();
        state.requests.writes += 1;
        state.check_writable()?;
        if !state.atomic_batch_writes {
            return Err(StoreFailure::new(
                Some(501),
                "Batch updates are not supported by this store",
            ));
        }
        state.check_targets(store, cells)?;
        let rows = state.sheet_mut(store)?;
        for cell in cells {
            apply_cell(rows, cell);
        }
        Ok(())
    }

    async fn write_cell(&self, store: &StoreRef, cell: &CellWrite) -> StoreResult<()> {
        let mut state = self.state.write();
        state.requests.writes += 1;
        state.check_writable()?;
        if let Some(budget) = state.cell_write_budget {
            if budget == 0 {
                return Err(StoreFailure::unavailable(
                    "The service is currently unavailable.",
                ));
            }
            state.cell_write_budget = Some(budget - 1);
        }
        state.check_targets(store, std::slice::from_ref(cell))?;
        let rows = state.sheet_mut(store)?;
        apply_cell(rows, cell);
        Ok(())
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            atomic_batch_writes: self.state.read().atomic_batch_writes,
        }
    }
}
