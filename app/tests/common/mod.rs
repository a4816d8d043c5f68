//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for cost-abc integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use app_lib::AnalysisConfig;
use pareto_engine::AggregationGranularity;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// One raw cost row: (code, name, quantity, date, team, category,
/// material total, processing total, total cost).
pub type FixtureRow = (
    &'static str,
    &'static str,
    f64,
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    f64,
);

/// Three factory sheets with a product shared between K1 and K2.
pub struct FactoryFixture;

impl FactoryFixture {
    pub fn sheets() -> Vec<(&'static str, Vec<FixtureRow>)> {
        vec![
            (
                "K1",
                vec![
                    ("A100", "Bolt", 500.0, "1/5", "T1", "Metal", 1000.0, 200.0, 1200.0),
                    ("A100", "Bolt", 300.0, "2/3", "T1", "Metal", 600.0, 100.0, 700.0),
                    ("B200", "Nut", 150.0, "1/7", "T2", "Metal", 300.0, 50.0, 350.0),
                    ("C300", "Washer", 50.0, "", "T2", "Plastic", 100.0, 20.0, 120.0),
                ],
            ),
            (
                "K2",
                vec![
                    ("A100", "Bolt", 100.0, "1/9", "T1", "Metal", 200.0, 40.0, 240.0),
                    ("D400", "Spring", 900.0, "3/1", "T3", "Spring", 1800.0, 300.0, 2100.0),
                ],
            ),
            (
                "K3",
                vec![("E500", "Gear", 100.0, "2/20", "T1", "Gear", 400.0, 80.0, 480.0)],
            ),
        ]
    }

    /// Sum of every quantity in the fixture.
    pub const TOTAL_QUANTITY: f64 = 2100.0;
}

/// Column positions inside A:S.
const CODE: u16 = 0;
const NAME: u16 = 1;
const QUANTITY: u16 = 2;
const DATE: u16 = 3;
const TEAM: u16 = 5;
const CATEGORY: u16 = 6;
const MATERIAL_TOTAL: u16 = 11;
const PROCESSING_TOTAL: u16 = 17;
const TOTAL_COST: u16 = 18;

/// Writes the fixture workbook into a temp dir and hands out configs for it.
pub struct TestHarness {
    pub dir: TempDir,
    pub source: PathBuf,
}

impl TestHarness {
    /// Harness with the three-factory workbook.
    pub fn with_factories() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("costs.xlsx");
        write_workbook(&source, &FactoryFixture::sheets());
        TestHarness { dir, source }
    }

    pub fn config(&self) -> AnalysisConfig {
        AnalysisConfig::new(&self.source)
    }

    pub fn monthly_config(&self) -> AnalysisConfig {
        let mut config = self.config();
        config.granularity = AggregationGranularity::Monthly;
        config
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn write_workbook(path: &Path, sheets: &[(&'static str, Vec<FixtureRow>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();

        // Header row sits above the A2:S data range.
        sheet.write_string(0, CODE, "Code").unwrap();
        sheet.write_string(0, NAME, "Name").unwrap();
        sheet.write_string(0, QUANTITY, "Quantity").unwrap();
        sheet.write_string(0, DATE, "Date").unwrap();

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            let (code, name, qty, date, team, category, material, processing, total) = *row;
            sheet.write_string(r, CODE, code).unwrap();
            sheet.write_string(r, NAME, name).unwrap();
            sheet.write_number(r, QUANTITY, qty).unwrap();
            if !date.is_empty() {
                sheet.write_string(r, DATE, date).unwrap();
            }
            sheet.write_string(r, TEAM, team).unwrap();
            sheet.write_string(r, CATEGORY, category).unwrap();
            sheet.write_number(r, MATERIAL_TOTAL, material).unwrap();
            sheet.write_number(r, PROCESSING_TOTAL, processing).unwrap();
            sheet.write_number(r, TOTAL_COST, total).unwrap();
        }
    }
    workbook.save(path).unwrap();
}
