//! FILENAME: core/persistence/src/csv_reader.rs
// PURPOSE: Reads one partition of raw rows from a delimited text file.

use std::io::Read;
use std::path::Path;

use pareto_engine::{RawRow, SourcePartition};

use crate::PersistenceError;

/// Reads a CSV file as a single partition. The first `skip_rows` records
/// (usually the header) are dropped; record lengths may vary.
pub fn load_csv_partition(
    path: &Path,
    label: &str,
    skip_rows: usize,
) -> Result<SourcePartition, PersistenceError> {
    let file = std::fs::File::open(path)?;
    read_csv_partition(file, label, skip_rows)
}

/// Same as [`load_csv_partition`] over any reader.
pub fn read_csv_partition<R: Read>(
    reader: R,
    label: &str,
    skip_rows: usize,
) -> Result<SourcePartition, PersistenceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records().skip(skip_rows) {
        let record = record?;
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        // A UTF-8 BOM survives into the first field of the file.
        if let Some(first) = cells.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        let raw = RawRow::new(cells);
        if !raw.is_blank() {
            rows.push(raw);
        }
    }

    log::debug!("read {} rows from csv partition {}", rows.len(), label);
    Ok(SourcePartition::new(label, rows))
}

/// Partition label for a file: its stem ("K1.csv" -> "K1").
pub fn partition_label_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
