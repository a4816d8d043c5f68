// FILENAME: core\persistence\src\xlsx_reader.rs

use crate::{PersistenceError, SourceRange};
use calamine::{open_workbook, Data, Reader, Xlsx};
use pareto_engine::{RawRow, SourcePartition};
use std::path::Path;

/// Reads each configured range as one partition labelled with its sheet name.
pub fn load_xlsx_partitions(
    path: &Path,
    ranges: &[SourceRange],
) -> Result<Vec<SourcePartition>, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let mut partitions = Vec::with_capacity(ranges.len());

    for source in ranges {
        if !sheet_names.iter().any(|name| name == &source.sheet) {
            return Err(PersistenceError::SheetNotFound(source.sheet.clone()));
        }

        let range = workbook
            .worksheet_range(&source.sheet)
            .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;

        // Range coordinates are relative to the first used cell.
        let (origin_row, origin_col) = range.start().unwrap_or((0, 0));
        let mut rows = Vec::new();

        for (row_idx, row) in range.rows().enumerate() {
            let abs_row = origin_row + row_idx as u32;
            if !source.contains_row(abs_row) {
                continue;
            }

            let mut cells = vec![String::new(); source.width()];
            for (col_idx, cell) in row.iter().enumerate() {
                let abs_col = origin_col + col_idx as u32;
                if source.contains_col(abs_col) {
                    cells[(abs_col - source.start_col) as usize] = cell_to_raw_string(cell);
                }
            }

            let raw = RawRow::new(cells);
            if !raw.is_blank() {
                rows.push(raw);
            }
        }

        log::debug!("read {} rows from {}", rows.len(), source);
        partitions.push(SourcePartition::new(source.sheet.clone(), rows));
    }

    Ok(partitions)
}

/// Renders a cell the way a spreadsheet's formatted-value API would:
/// integers without a fractional part, dates as month/day.
pub fn cell_to_raw_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Data::Error(e) => format!("{:?}", e),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%-m/%-d").to_string())
            .unwrap_or_else(|| format_number(dt.as_f64())),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Formats a number without a trailing ".0" for whole values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
