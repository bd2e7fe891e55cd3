//! Row ranges and A1 notation.

use crate::constants::sheet;
use crate::models::RowAddress;
use serde::{Deserialize, Serialize};

/// Inclusive, full-width range of 1-based rows. `last_row: None` reads to the
/// end of the data extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    pub first_row: u32,
    pub last_row: Option<u32>,
}

impl RowRange {
    /// Every row, header included
    pub fn all() -> Self {
        Self {
            first_row: 1,
            last_row: None,
        }
    }

    pub fn header() -> Self {
        Self::single(RowAddress::new(sheet::HEADER_ROW))
    }

    pub fn single(row: RowAddress) -> Self {
        Self {
            first_row: row.row(),
            last_row: Some(row.row()),
        }
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.first_row && self.last_row.map_or(true, |last| row <= last)
    }

    /// A1 notation such as `Sheet1!A2:ZZ2` or `'Call List'!A1:ZZ`
    pub fn to_a1(&self, sheet_name: &str) -> String {
        let sheet_name = quote_sheet_name(sheet_name);
        match self.last_row {
            Some(last) => format!(
                "{sheet_name}!A{}:{}{last}",
                self.first_row,
                sheet::LAST_COLUMN
            ),
            None => format!("{sheet_name}!A{}:{}", self.first_row, sheet::LAST_COLUMN),
        }
    }
}

/// Column letters for a 0-based column index (`0 -> A`, `25 -> Z`, `26 -> AA`)
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Sheet names containing anything but ASCII alphanumerics and underscores
/// must be single-quoted in A1 notation, with embedded quotes doubled.
pub(crate) fn quote_sheet_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_range_a1() {
        assert_eq!(RowRange::all().to_a1("Sheet1"), "Sheet1!A1:ZZ");
        assert_eq!(RowRange::header().to_a1("Sheet1"), "Sheet1!A1:ZZ1");
        assert_eq!(
            RowRange::single(RowAddress::new(7)).to_a1("Bob's list"),
            "'Bob''s list'!A7:ZZ7"
        );
    }

    #[test]
    fn test_range_contains() {
        assert!(RowRange::all().contains(9000));
        assert!(RowRange::header().contains(1));
        assert!(!RowRange::header().contains(2));
    }
}
