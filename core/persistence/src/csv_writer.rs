//! FILENAME: core/persistence/src/csv_writer.rs
// PURPOSE: Delimited-text export of a ranked selection.
// FORMAT: UTF-8 BOM, header line, one line per ranked row, TOTAL footer.

use std::io::Write;
use std::path::Path;

use pareto_engine::{CostTotals, ExportCell, RankedProduct, EXPORT_COLUMNS};

use crate::xlsx_reader::format_number;
use crate::PersistenceError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the export to any writer.
pub fn write_csv<W: Write>(
    mut out: W,
    rows: &[RankedProduct],
    totals: &CostTotals,
) -> Result<(), PersistenceError> {
    // Spreadsheet apps need the BOM to pick UTF-8 for non-ASCII names.
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_COLUMNS.iter().map(|c| c.header()))?;

    for row in rows {
        writer.write_record(row.export_cells().iter().map(render_cell))?;
    }
    writer.write_record(totals.export_cells().iter().map(render_cell))?;

    writer.flush()?;
    Ok(())
}

pub fn save_csv(
    path: &Path,
    rows: &[RankedProduct],
    totals: &CostTotals,
) -> Result<(), PersistenceError> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), rows, totals)
}

/// Text rendering of one export cell.
pub fn render_cell(cell: &ExportCell) -> String {
    match cell {
        ExportCell::Blank => String::new(),
        ExportCell::Text(s) => s.clone(),
        ExportCell::Number(n) => format_number(*n),
        ExportCell::Percent(p) => format!("{:.2}%", p),
    }
}
