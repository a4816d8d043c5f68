//! FILENAME: core/persistence/src/source_range.rs
// PURPOSE: A1-style source range specs such as "K1!A2:S".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// Factory sheets read when no ranges are configured.
/// Row 1 holds headers, so every range starts at row 2.
pub const DEFAULT_SOURCE_RANGES: [&str; 3] = ["K1!A2:S", "K2!A2:S", "K3!A2:S"];

/// Column count of an XLSX sheet (last column XFD).
pub const MAX_COLUMNS: u32 = 16_384;

/// A rectangular block of one sheet, 0-indexed and inclusive.
/// `end_row == None` reads to the last used row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub sheet: String,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: Option<u32>,
    pub end_col: u32,
}

impl SourceRange {
    /// The whole used area of a sheet starting at row 2 (A2:S).
    pub fn whole_sheet(sheet: impl Into<String>) -> Self {
        SourceRange {
            sheet: sheet.into(),
            start_row: 1,
            start_col: 0,
            end_row: None,
            end_col: (pareto_engine::columns::WIDTH - 1) as u32,
        }
    }

    /// Parses the configured defaults.
    pub fn defaults() -> Vec<SourceRange> {
        DEFAULT_SOURCE_RANGES
            .iter()
            .filter_map(|spec| spec.parse().ok())
            .collect()
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.start_row && self.end_row.map_or(true, |end| row <= end)
    }

    pub fn contains_col(&self, col: u32) -> bool {
        col >= self.start_col && col <= self.end_col
    }

    pub fn width(&self) -> usize {
        (self.end_col - self.start_col + 1) as usize
    }
}

impl FromStr for SourceRange {
    type Err = PersistenceError;

    /// Accepts "Sheet!A2:S", "'My Sheet'!A2:S100" or a bare sheet name.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.trim();
        let (sheet, cells) = match spec.rsplit_once('!') {
            Some((sheet, cells)) => (sheet, Some(cells)),
            None => (spec, None),
        };

        let sheet = strip_quotes(sheet.trim());
        if sheet.is_empty() {
            return Err(PersistenceError::InvalidRange(format!(
                "missing sheet name in '{}'",
                spec
            )));
        }

        let Some(cells) = cells else {
            return Ok(SourceRange::whole_sheet(sheet));
        };

        let (start, end) = cells.split_once(':').ok_or_else(|| {
            PersistenceError::InvalidRange(format!("expected 'A2:S' style cells in '{}'", spec))
        })?;

        let (start_col, start_row) = parse_cell_ref(start)?;
        let start_row = start_row.ok_or_else(|| {
            PersistenceError::InvalidRange(format!("start cell needs a row number in '{}'", spec))
        })?;
        let (end_col, end_row) = parse_cell_ref(end)?;

        if end_col < start_col || end_row.is_some_and(|r| r < start_row) {
            return Err(PersistenceError::InvalidRange(format!(
                "end cell precedes start cell in '{}'",
                spec
            )));
        }

        Ok(SourceRange {
            sheet: sheet.to_string(),
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}:{}",
            self.sheet,
            col_index_to_letter(self.start_col),
            self.start_row + 1,
            col_index_to_letter(self.end_col)
        )?;
        if let Some(end_row) = self.end_row {
            write!(f, "{}", end_row + 1)?;
        }
        Ok(())
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

/// Parses "A2" into (col, Some(row)) or "S" into (col, None), 0-indexed.
fn parse_cell_ref(cell_ref: &str) -> Result<(u32, Option<u32>), PersistenceError> {
    let cell_ref = cell_ref.trim().to_uppercase();

    let col_end = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();

    if col_end == 0 {
        return Err(PersistenceError::InvalidRange(format!(
            "no column letters in '{}'",
            cell_ref
        )));
    }

    let col = col_letter_to_index(&cell_ref[..col_end]).ok_or_else(|| {
        PersistenceError::InvalidRange(format!(
            "column '{}' is beyond the last sheet column XFD",
            &cell_ref[..col_end]
        ))
    })?;
    let row_str = &cell_ref[col_end..];

    if row_str.is_empty() {
        return Ok((col, None));
    }

    let row: u32 = row_str.parse().map_err(|_| {
        PersistenceError::InvalidRange(format!("invalid row number in '{}'", cell_ref))
    })?;

    if row == 0 {
        return Err(PersistenceError::InvalidRange(
            "row number must be >= 1".to_string(),
        ));
    }

    Ok((col, Some(row - 1)))
}

/// Column letters to a 0-indexed column; `None` past [`MAX_COLUMNS`].
fn col_letter_to_index(col: &str) -> Option<u32> {
    let mut result: u32 = 0;
    for c in col.chars() {
        let val = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result.checked_mul(26)?.checked_add(val)?;
        if result > MAX_COLUMNS {
            return None;
        }
    }
    result.checked_sub(1)
}

/// Converts 0-indexed column to letters
fn col_index_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        result.insert(0, (b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    result
}
