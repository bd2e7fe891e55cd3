use crate::constants::sheet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names one tab of one spreadsheet in the backing store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreRef {
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet: String,
}

fn default_sheet_name() -> String {
    sheet::DEFAULT_SHEET_NAME.to_string()
}

impl StoreRef {
    pub fn new(spreadsheet_id: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet: sheet.into(),
        }
    }

    /// Reference to the default tab of a spreadsheet
    pub fn spreadsheet(spreadsheet_id: impl Into<String>) -> Self {
        Self::new(spreadsheet_id, default_sheet_name())
    }

    pub fn is_blank(&self) -> bool {
        self.spreadsheet_id.trim().is_empty()
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spreadsheet_id, self.sheet)
    }
}
