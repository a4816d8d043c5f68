//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::PersistenceError;
use pareto_engine::{CostTotals, ExportCell, ExportColumn, RankedProduct, EXPORT_COLUMNS};
use rust_xlsxwriter::{Format, FormatAlign, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

pub const EXPORT_SHEET_NAME: &str = "Cost Analysis";

const NUMBER_FORMAT: &str = "#,##0";
const FRACTION_FORMAT: &str = "#,##0.00";
const PERCENT_FORMAT: &str = "0.00%";

pub fn save_xlsx(
    path: &Path,
    rows: &[RankedProduct],
    totals: &CostTotals,
) -> Result<(), PersistenceError> {
    let mut xlsx = build_workbook(rows, totals)?;
    xlsx.save(path)?;
    Ok(())
}

/// Renders the workbook to memory (for HTTP downloads).
pub fn xlsx_to_buffer(
    rows: &[RankedProduct],
    totals: &CostTotals,
) -> Result<Vec<u8>, PersistenceError> {
    let mut xlsx = build_workbook(rows, totals)?;
    Ok(xlsx.save_to_buffer()?)
}

fn build_workbook(
    rows: &[RankedProduct],
    totals: &CostTotals,
) -> Result<XlsxWorkbook, PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();
    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new().set_bold().set_align(FormatAlign::Center);
    for (col, column) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.set_column_width(col as u16, column_width(*column))?;
        worksheet.write_string_with_format(0, col as u16, column.header(), &header_format)?;
    }

    let body = Format::new();
    for (idx, row) in rows.iter().enumerate() {
        write_cells(worksheet, (idx + 1) as u32, &row.export_cells(), &body)?;
    }

    let footer = Format::new().set_bold();
    write_cells(worksheet, (rows.len() + 1) as u32, &totals.export_cells(), &footer)?;

    worksheet.set_freeze_panes(1, 0)?;
    Ok(xlsx)
}

fn write_cells(
    worksheet: &mut Worksheet,
    row: u32,
    cells: &[ExportCell],
    base: &Format,
) -> Result<(), PersistenceError> {
    let percent = base.clone().set_num_format(PERCENT_FORMAT);

    for (col, cell) in cells.iter().enumerate() {
        let col = col as u16;
        match cell {
            ExportCell::Blank => {}
            ExportCell::Text(s) => {
                worksheet.write_string_with_format(row, col, s, base)?;
            }
            ExportCell::Number(n) => {
                let format = base.clone().set_num_format(number_format_for(*n));
                worksheet.write_number_with_format(row, col, *n, &format)?;
            }
            // Excel percentages are fractions.
            ExportCell::Percent(p) => {
                worksheet.write_number_with_format(row, col, *p / 100.0, &percent)?;
            }
        }
    }
    Ok(())
}

/// Whole values keep the plain thousands format; fractional sums show cents.
fn number_format_for(n: f64) -> &'static str {
    if n.fract() == 0.0 {
        NUMBER_FORMAT
    } else {
        FRACTION_FORMAT
    }
}

/// Character widths tuned for typical codes, names and cost figures.
fn column_width(column: ExportColumn) -> f64 {
    match column {
        ExportColumn::Rank => 6.0,
        ExportColumn::Code => 12.0,
        ExportColumn::Name => 30.0,
        ExportColumn::Team | ExportColumn::Category => 10.0,
        ExportColumn::Quantity | ExportColumn::CumulativeRatio | ExportColumn::OccurrenceCount => {
            12.0
        }
        ExportColumn::TotalCost => 18.0,
        _ => 15.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use pareto_engine::{
        aggregate_partitions, calculate_pareto, columns, AggregationGranularity, ProductFilter,
        RawRow, SourcePartition,
    };

    fn sample() -> (Vec<RankedProduct>, CostTotals) {
        let rows = (1..=3)
            .map(|i| {
                let mut cells = vec![String::new(); columns::WIDTH];
                cells[columns::CODE] = format!("P{}", i);
                cells[columns::NAME] = format!("Product {}", i);
                cells[columns::QUANTITY] = format!("{}", i * 10);
                cells[columns::MATERIAL_TOTAL] = "100".to_string();
                RawRow(cells)
            })
            .collect();
        let products = aggregate_partitions(
            &[SourcePartition::new("K1", rows)],
            AggregationGranularity::AllTime,
        );
        let view = calculate_pareto(&products, &ProductFilter::all());
        let totals = CostTotals::from_products(view.rows.iter().map(|r| &r.product));
        (view.rows, totals)
    }

    #[test]
    fn test_save_and_read_back() {
        let (rows, totals) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        save_xlsx(&path, &rows, &totals).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![EXPORT_SHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(EXPORT_SHEET_NAME).unwrap();
        assert_eq!(range.get_size(), (5, 20));
        assert_eq!(range.get((0, 0)), Some(&Data::String("Rank".to_string())));
        assert_eq!(range.get((1, 1)), Some(&Data::String("P3".to_string())));
        assert_eq!(range.get((1, 3)), Some(&Data::Float(30.0)));
        assert_eq!(range.get((3, 4)), Some(&Data::Float(1.0)));
        assert_eq!(range.get((4, 0)), Some(&Data::String("TOTAL".to_string())));
        assert_eq!(range.get((4, 3)), Some(&Data::Float(60.0)));
        assert_eq!(range.get((4, 12)), Some(&Data::Float(300.0)));
    }

    #[test]
    fn test_fractional_figures_keep_decimals() {
        assert_eq!(number_format_for(1200.0), NUMBER_FORMAT);
        assert_eq!(number_format_for(1200.5), FRACTION_FORMAT);
        assert_eq!(number_format_for(-0.25), FRACTION_FORMAT);

        let (mut rows, mut totals) = sample();
        rows[0].product.figures.total_cost = 12.75;
        totals.figures.total_cost = 12.75;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fraction.xlsx");
        save_xlsx(&path, &rows, &totals).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(EXPORT_SHEET_NAME).unwrap();
        assert_eq!(range.get((1, 19)), Some(&Data::Float(12.75)));
        assert_eq!(range.get((4, 19)), Some(&Data::Float(12.75)));
    }

    #[test]
    fn test_buffer_is_a_zip() {
        let (rows, totals) = sample();
        let bytes = xlsx_to_buffer(&rows, &totals).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
