//! FILENAME: core/persistence/src/lib.rs
//! Persistence Module
//!
//! Reads raw cost rows from XLSX workbooks or CSV files and writes ranked
//! results back out as CSV or XLSX. Everything here sits at the edges of the
//! analysis: `pareto-engine` never touches a file.

mod csv_reader;
mod csv_writer;
mod error;
mod source_range;
mod xlsx_reader;
mod xlsx_writer;

pub use csv_reader::{load_csv_partition, partition_label_for, read_csv_partition};
pub use csv_writer::{render_cell, save_csv, write_csv};
pub use error::PersistenceError;
pub use source_range::{SourceRange, DEFAULT_SOURCE_RANGES};
pub use xlsx_reader::{cell_to_raw_string, format_number, load_xlsx_partitions};
pub use xlsx_writer::{save_xlsx, xlsx_to_buffer, EXPORT_SHEET_NAME};

use chrono::NaiveDate;
use pareto_engine::SourcePartition;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// EXPORT KIND
// ============================================================================

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Csv,
    Xlsx,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportKind::Csv => "text/csv; charset=utf-8",
            ExportKind::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(ExportKind::Csv),
            "xlsx" | "excel" => Some(ExportKind::Xlsx),
            _ => None,
        }
    }
}

/// "cost_analysis_2024-01-31.xlsx" / "abc_analysis_2024-01-31.csv".
pub fn default_export_file_name(kind: ExportKind, date: NaiveDate) -> String {
    let stem = match kind {
        ExportKind::Xlsx => "cost_analysis",
        ExportKind::Csv => "abc_analysis",
    };
    format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), kind.extension())
}

// ============================================================================
// SOURCE LOADING
// ============================================================================

/// Loads partitions from a source file, choosing the reader by extension.
/// XLSX sources read every range; a CSV source is one partition named
/// after the file, with its header row skipped.
pub fn load_source(
    path: &Path,
    ranges: &[SourceRange],
) -> Result<Vec<SourcePartition>, PersistenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => load_xlsx_partitions(path, ranges),
        "csv" | "txt" => {
            let label = partition_label_for(path);
            Ok(vec![load_csv_partition(path, &label, 1)?])
        }
        other => Err(PersistenceError::InvalidFormat(format!(
            "unsupported source extension '{}'",
            other
        ))),
    }
}
