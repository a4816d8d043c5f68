//! FILENAME: core/pareto-engine/src/view.rs
//! Pareto View - Ranked output for rendering and export.
//!
//! This module holds the shapes handed to the outside world:
//! - `RankedProduct`: an aggregated product plus its position and running totals
//! - `ParetoView` / `SelectionView`: ordered rows plus summaries
//! - `CostTotals`: the footer record over a set of products
//! - `ExportColumn`: the fixed column order every exporter consumes

use serde::{Deserialize, Serialize};

use crate::cache::{AggregatedProduct, CostFigures};
use crate::definition::{CORE_ITEM_THRESHOLD_PERCENT, SECONDARY_ITEM_THRESHOLD_PERCENT};

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// ABC band of a ranked product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        }
    }
}

/// Core (A-class) predicate over a cumulative ratio in percent.
pub fn is_core_item(cumulative_ratio_percent: f64) -> bool {
    cumulative_ratio_percent <= CORE_ITEM_THRESHOLD_PERCENT
}

/// Three-band classification; band A is exactly [`is_core_item`].
pub fn classify(cumulative_ratio_percent: f64) -> AbcClass {
    if is_core_item(cumulative_ratio_percent) {
        AbcClass::A
    } else if cumulative_ratio_percent <= SECONDARY_ITEM_THRESHOLD_PERCENT {
        AbcClass::B
    } else {
        AbcClass::C
    }
}

// ============================================================================
// RANKED PRODUCT
// ============================================================================

/// An aggregated product positioned in a ranked sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProduct {
    /// 1-based position in the ranked output.
    pub rank: usize,
    pub product: AggregatedProduct,
    /// Running quantity total up to and including this row.
    pub cumulative_quantity: f64,
    /// cumulative_quantity / set total * 100, or 0 for a zero-total set.
    pub cumulative_ratio_percent: f64,
}

impl RankedProduct {
    pub fn is_core_item(&self) -> bool {
        is_core_item(self.cumulative_ratio_percent)
    }

    pub fn abc_class(&self) -> AbcClass {
        classify(self.cumulative_ratio_percent)
    }

    /// Cells in [`EXPORT_COLUMNS`] order.
    pub fn export_cells(&self) -> Vec<ExportCell> {
        let p = &self.product;
        let f = &p.figures;
        EXPORT_COLUMNS
            .iter()
            .map(|column| match column {
                ExportColumn::Rank => ExportCell::Number(self.rank as f64),
                ExportColumn::Code => ExportCell::Text(p.code().to_string()),
                ExportColumn::Name => ExportCell::Text(p.name.clone()),
                ExportColumn::CumulativeRatio => ExportCell::Percent(self.cumulative_ratio_percent),
                ExportColumn::OccurrenceCount => ExportCell::Number(p.occurrence_count as f64),
                ExportColumn::Team => ExportCell::Text(p.team.clone()),
                ExportColumn::Category => ExportCell::Text(p.category.clone()),
                numeric => ExportCell::Number(numeric.figure(f).unwrap_or_default()),
            })
            .collect()
    }
}

// ============================================================================
// TOTALS
// ============================================================================

/// Sums over a set of products; same numeric shape as a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    pub product_count: usize,
    pub occurrence_count: u64,
    pub figures: CostFigures,
}

impl CostTotals {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a AggregatedProduct>,
    {
        let mut totals = CostTotals::default();
        for product in products {
            totals.product_count += 1;
            totals.occurrence_count += u64::from(product.occurrence_count);
            totals.figures.add(&product.figures);
        }
        totals
    }

    /// Footer cells in [`EXPORT_COLUMNS`] order: "TOTAL" under rank,
    /// blanks for identity/descriptive/ratio columns, sums elsewhere.
    pub fn export_cells(&self) -> Vec<ExportCell> {
        EXPORT_COLUMNS
            .iter()
            .map(|column| match column {
                ExportColumn::Rank => ExportCell::Text(TOTAL_LABEL.to_string()),
                ExportColumn::Code
                | ExportColumn::Name
                | ExportColumn::CumulativeRatio
                | ExportColumn::Team
                | ExportColumn::Category => ExportCell::Blank,
                ExportColumn::OccurrenceCount => ExportCell::Number(self.occurrence_count as f64),
                numeric => ExportCell::Number(numeric.figure(&self.figures).unwrap_or_default()),
            })
            .collect()
    }
}

/// Label written in the rank column of the footer row.
pub const TOTAL_LABEL: &str = "TOTAL";

// ============================================================================
// VIEWS
// ============================================================================

/// The main ranked view for a set of categorical filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoView {
    pub rows: Vec<RankedProduct>,
    pub total_quantity: f64,
    /// Rows whose cumulative ratio is within the core threshold.
    pub core_item_count: usize,
}

impl ParetoView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The ranked subset of explicitly selected products plus its totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub rows: Vec<RankedProduct>,
    pub totals: CostTotals,
}

impl SelectionView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Distinct values available for each categorical filter, each list
/// starting with the "All" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub partitions: Vec<String>,
    pub teams: Vec<String>,
    pub categories: Vec<String>,
}

// ============================================================================
// EXPORT LAYOUT
// ============================================================================

/// Export columns in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportColumn {
    Rank,
    Code,
    Name,
    Quantity,
    CumulativeRatio,
    OccurrenceCount,
    Team,
    Category,
    RawMaterial,
    SubMaterial,
    Packaging,
    Consumable,
    MaterialTotal,
    Depreciation,
    DirectLabor,
    IndirectLabor,
    Utility,
    OtherExpense,
    ProcessingTotal,
    TotalCost,
}

pub const EXPORT_COLUMNS: [ExportColumn; 20] = [
    ExportColumn::Rank,
    ExportColumn::Code,
    ExportColumn::Name,
    ExportColumn::Quantity,
    ExportColumn::CumulativeRatio,
    ExportColumn::OccurrenceCount,
    ExportColumn::Team,
    ExportColumn::Category,
    ExportColumn::RawMaterial,
    ExportColumn::SubMaterial,
    ExportColumn::Packaging,
    ExportColumn::Consumable,
    ExportColumn::MaterialTotal,
    ExportColumn::Depreciation,
    ExportColumn::DirectLabor,
    ExportColumn::IndirectLabor,
    ExportColumn::Utility,
    ExportColumn::OtherExpense,
    ExportColumn::ProcessingTotal,
    ExportColumn::TotalCost,
];

impl ExportColumn {
    pub fn header(&self) -> &'static str {
        match self {
            ExportColumn::Rank => "Rank",
            ExportColumn::Code => "Product Code",
            ExportColumn::Name => "Product Name",
            ExportColumn::Quantity => "Quantity",
            ExportColumn::CumulativeRatio => "Cumulative Ratio (%)",
            ExportColumn::OccurrenceCount => "Production Runs",
            ExportColumn::Team => "Team",
            ExportColumn::Category => "Category",
            ExportColumn::RawMaterial => "Raw Material",
            ExportColumn::SubMaterial => "Sub Material",
            ExportColumn::Packaging => "Packaging",
            ExportColumn::Consumable => "Consumables",
            ExportColumn::MaterialTotal => "Material Total",
            ExportColumn::Depreciation => "Depreciation",
            ExportColumn::DirectLabor => "Direct Labor",
            ExportColumn::IndirectLabor => "Indirect Labor",
            ExportColumn::Utility => "Utility",
            ExportColumn::OtherExpense => "Other Expense",
            ExportColumn::ProcessingTotal => "Processing Total",
            ExportColumn::TotalCost => "Total Cost",
        }
    }

    /// The accumulated figure backing this column, if it is one.
    pub fn figure(&self, f: &CostFigures) -> Option<f64> {
        let value = match self {
            ExportColumn::Quantity => f.quantity,
            ExportColumn::RawMaterial => f.raw_material,
            ExportColumn::SubMaterial => f.sub_material,
            ExportColumn::Packaging => f.packaging,
            ExportColumn::Consumable => f.consumable,
            ExportColumn::MaterialTotal => f.material_total,
            ExportColumn::Depreciation => f.depreciation,
            ExportColumn::DirectLabor => f.direct_labor,
            ExportColumn::IndirectLabor => f.indirect_labor,
            ExportColumn::Utility => f.utility,
            ExportColumn::OtherExpense => f.other_expense,
            ExportColumn::ProcessingTotal => f.processing_total,
            ExportColumn::TotalCost => f.total_cost,
            _ => return None,
        };
        Some(value)
    }
}

/// A single exported cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportCell {
    Blank,
    Text(String),
    Number(f64),
    /// A percentage expressed in percent units (57.1 means 57.1 %).
    Percent(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ProductKey;

    fn product(code: &str, qty: f64) -> AggregatedProduct {
        AggregatedProduct {
            key: ProductKey::new("K1", code),
            name: format!("Product {}", code),
            team: "Team".to_string(),
            category: "Cat".to_string(),
            figures: CostFigures {
                quantity: qty,
                material_total: qty * 2.0,
                total_cost: qty * 3.0,
                ..CostFigures::default()
            },
            occurrence_count: 2,
            date_range: "-".to_string(),
        }
    }

    #[test]
    fn test_classification_boundaries() {
        assert!(is_core_item(80.0));
        assert!(!is_core_item(80.0001));
        assert_eq!(classify(0.0), AbcClass::A);
        assert_eq!(classify(80.0), AbcClass::A);
        assert_eq!(classify(90.0), AbcClass::B);
        assert_eq!(classify(95.0), AbcClass::B);
        assert_eq!(classify(100.0), AbcClass::C);
    }

    #[test]
    fn test_export_column_count_and_order() {
        assert_eq!(EXPORT_COLUMNS.len(), 20);
        assert_eq!(EXPORT_COLUMNS[0], ExportColumn::Rank);
        assert_eq!(EXPORT_COLUMNS[4], ExportColumn::CumulativeRatio);
        assert_eq!(EXPORT_COLUMNS[12], ExportColumn::MaterialTotal);
        assert_eq!(EXPORT_COLUMNS[18], ExportColumn::ProcessingTotal);
        assert_eq!(EXPORT_COLUMNS[19], ExportColumn::TotalCost);
    }

    #[test]
    fn test_ranked_export_cells() {
        let ranked = RankedProduct {
            rank: 1,
            product: product("A", 10.0),
            cumulative_quantity: 10.0,
            cumulative_ratio_percent: 57.5,
        };
        let cells = ranked.export_cells();
        assert_eq!(cells.len(), EXPORT_COLUMNS.len());
        assert_eq!(cells[0], ExportCell::Number(1.0));
        assert_eq!(cells[1], ExportCell::Text("A".to_string()));
        assert_eq!(cells[3], ExportCell::Number(10.0));
        assert_eq!(cells[4], ExportCell::Percent(57.5));
        assert_eq!(cells[5], ExportCell::Number(2.0));
        assert_eq!(cells[12], ExportCell::Number(20.0));
        assert_eq!(cells[19], ExportCell::Number(30.0));
    }

    #[test]
    fn test_ranked_product_json_shape() {
        let ranked = RankedProduct {
            rank: 3,
            product: product("A", 10.0),
            cumulative_quantity: 10.0,
            cumulative_ratio_percent: 100.0,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["rank"], 3);
        assert_eq!(json["cumulativeRatioPercent"], 100.0);
        assert_eq!(json["product"]["key"]["partition"], "K1");
        assert!(json["product"]["key"].get("month").is_none());
        assert_eq!(json["product"]["occurrenceCount"], 2);
        assert_eq!(json["product"]["figures"]["materialTotal"], 20.0);
    }

    #[test]
    fn test_totals_export_cells() {
        let products = vec![product("A", 10.0), product("B", 5.0)];
        let totals = CostTotals::from_products(&products);
        assert_eq!(totals.product_count, 2);
        assert_eq!(totals.occurrence_count, 4);
        assert_eq!(totals.figures.quantity, 15.0);

        let cells = totals.export_cells();
        assert_eq!(cells[0], ExportCell::Text(TOTAL_LABEL.to_string()));
        assert_eq!(cells[1], ExportCell::Blank);
        assert_eq!(cells[3], ExportCell::Number(15.0));
        assert_eq!(cells[4], ExportCell::Blank);
        assert_eq!(cells[19], ExportCell::Number(45.0));
    }
}
