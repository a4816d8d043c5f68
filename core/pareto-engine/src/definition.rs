//! FILENAME: core/pareto-engine/src/definition.rs
//! Pareto Definition - The serializable configuration and input shapes.
//!
//! This module contains everything needed to DESCRIBE an analysis run:
//! - Raw source rows and the partitions (factory sheets) they arrive in
//! - The aggregation granularity (what makes two rows "the same product")
//! - Categorical filters and the explicit selection set
//!
//! These structures are plain data: the aggregation and ranking logic
//! never stores them beyond a single call.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Placeholder used when a source row carries no product code.
pub const MISSING_CODE: &str = "CodeN/A";

/// Partition label used when a sheet name sanitizes to nothing.
pub const UNKNOWN_PARTITION: &str = "Unknown";

/// Rendered date range for a product with no observation dates.
pub const DATE_RANGE_EMPTY: &str = "-";

/// Separator between the first and last date of a multi-date range.
pub const DATE_RANGE_SEPARATOR: &str = "~";

/// Cumulative ratio (percent) at or below which a product is a core (A-class) item.
pub const CORE_ITEM_THRESHOLD_PERCENT: f64 = 80.0;

/// Cumulative ratio (percent) at or below which a non-core product is B-class.
pub const SECONDARY_ITEM_THRESHOLD_PERCENT: f64 = 95.0;

/// Literal accepted from callers as the match-all filter sentinel.
pub const FILTER_ALL: &str = "All";

// ============================================================================
// RAW INPUT
// ============================================================================

/// Positional layout of a raw source row (0-based column indices).
/// Column 4 (order number) is present in the source but never read.
pub mod columns {
    pub const CODE: usize = 0;
    pub const NAME: usize = 1;
    pub const QUANTITY: usize = 2;
    pub const DATE: usize = 3;
    pub const TEAM: usize = 5;
    pub const CATEGORY: usize = 6;

    pub const RAW_MATERIAL: usize = 7;
    pub const SUB_MATERIAL: usize = 8;
    pub const PACKAGING: usize = 9;
    pub const CONSUMABLE: usize = 10;
    pub const MATERIAL_TOTAL: usize = 11;

    pub const DEPRECIATION: usize = 12;
    pub const DIRECT_LABOR: usize = 13;
    pub const INDIRECT_LABOR: usize = 14;
    pub const UTILITY: usize = 15;
    pub const OTHER_EXPENSE: usize = 16;
    pub const PROCESSING_TOTAL: usize = 17;

    pub const TOTAL_COST: usize = 18;

    /// Number of columns a complete row spans (A..S).
    pub const WIDTH: usize = 19;
}

/// One source record as an ordered sequence of raw cell strings.
/// Rows may be shorter than [`columns::WIDTH`]; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(pub Vec<String>);

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        RawRow(cells)
    }

    /// Returns the cell at `index`, or "" when the row is too short.
    pub fn cell(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|c| c.trim().is_empty())
    }
}

impl<S: Into<String>> FromIterator<S> for RawRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RawRow(iter.into_iter().map(Into::into).collect())
    }
}

/// A named group of raw rows (typically one factory sheet).
/// The label is used as-is here; the aggregator sanitizes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePartition {
    pub label: String,
    pub rows: Vec<RawRow>,
}

impl SourcePartition {
    pub fn new(label: impl Into<String>, rows: Vec<RawRow>) -> Self {
        SourcePartition {
            label: label.into(),
            rows,
        }
    }
}

// ============================================================================
// GRANULARITY
// ============================================================================

/// How raw rows collapse into products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationGranularity {
    /// One product per (partition, code) across every observation date.
    #[default]
    AllTime,
    /// One product per (partition, month, code).
    Monthly,
}

impl AggregationGranularity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "alltime" | "all-time" | "all_time" => Some(AggregationGranularity::AllTime),
            "month" | "monthly" => Some(AggregationGranularity::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for AggregationGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationGranularity::AllTime => write!(f, "all-time"),
            AggregationGranularity::Monthly => write!(f, "monthly"),
        }
    }
}

/// Extracts the month bucket from an observation date like "1/2".
/// Dates without a '/' have no month.
pub fn month_of(date: &str) -> Option<String> {
    let date = date.trim();
    if !date.contains('/') {
        return None;
    }
    date.split('/')
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

// ============================================================================
// PRODUCT KEY
// ============================================================================

/// Value-typed identity of an aggregated product.
///
/// `month` is only populated under [`AggregationGranularity::Monthly`].
/// Field order gives the derived `Ord` partition-then-month-then-code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductKey {
    pub partition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub code: String,
}

impl ProductKey {
    pub fn new(partition: impl Into<String>, code: impl Into<String>) -> Self {
        ProductKey {
            partition: partition.into(),
            month: None,
            code: code.into(),
        }
    }

    pub fn with_month(mut self, month: Option<String>) -> Self {
        self.month = month;
        self
    }

    /// Parses "PARTITION:CODE" or "PARTITION:MONTH:CODE".
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [partition, code] if !partition.is_empty() && !code.is_empty() => {
                Some(ProductKey::new(*partition, *code))
            }
            [partition, month, code] if !partition.is_empty() && !code.is_empty() => {
                let month = (!month.is_empty()).then(|| month.to_string());
                Some(ProductKey::new(*partition, *code).with_month(month))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.month {
            Some(month) => write!(f, "{}:{}:{}", self.partition, month, self.code),
            None => write!(f, "{}:{}", self.partition, self.code),
        }
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// A single categorical restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterValue {
    /// Match-all sentinel.
    #[default]
    All,
    /// Exact equality against the field.
    Only(String),
}

impl FilterValue {
    /// Maps the "All" literal (and empty input) to the sentinel.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == FILTER_ALL {
            FilterValue::All
        } else {
            FilterValue::Only(s.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }
}

impl From<Option<String>> for FilterValue {
    fn from(value: Option<String>) -> Self {
        value.map(|v| FilterValue::parse(&v)).unwrap_or_default()
    }
}

/// Categorical filters composed by logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default)]
    pub partition: FilterValue,
    #[serde(default)]
    pub team: FilterValue,
    #[serde(default)]
    pub category: FilterValue,
}

impl ProductFilter {
    /// A filter that restricts nothing.
    pub fn all() -> Self {
        ProductFilter::default()
    }

    pub fn partition(mut self, value: impl Into<String>) -> Self {
        self.partition = FilterValue::Only(value.into());
        self
    }

    pub fn team(mut self, value: impl Into<String>) -> Self {
        self.team = FilterValue::Only(value.into());
        self
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = FilterValue::Only(value.into());
        self
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// Products explicitly picked for detailed export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    keys: BTreeSet<ProductKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        SelectionSet::default()
    }

    pub fn contains(&self, key: &ProductKey) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: ProductKey) -> bool {
        self.keys.insert(key)
    }

    /// Selects `key` if absent, deselects it otherwise.
    /// Returns whether the key is selected afterwards.
    pub fn toggle(&mut self, key: ProductKey) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    /// Select-all toggle over a visible set of keys: when every key is already
    /// selected they are all removed, otherwise they are all added.
    /// Keys outside `visible` are left alone.
    pub fn toggle_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a ProductKey>,
    {
        let visible: Vec<&ProductKey> = visible.into_iter().collect();
        if visible.iter().all(|k| self.keys.contains(*k)) {
            for key in visible {
                self.keys.remove(key);
            }
        } else {
            for key in visible {
                self.keys.insert(key.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<ProductKey> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = ProductKey>>(iter: I) -> Self {
        SelectionSet {
            keys: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_missing_cell_is_empty() {
        let row: RawRow = ["A1", "Widget"].into_iter().collect();
        assert_eq!(row.cell(columns::CODE), "A1");
        assert_eq!(row.cell(columns::TOTAL_COST), "");
    }

    #[test]
    fn test_month_of() {
        assert_eq!(month_of("1/2"), Some("1".to_string()));
        assert_eq!(month_of("12/31"), Some("12".to_string()));
        assert_eq!(month_of("2024-01-02"), None);
        assert_eq!(month_of(""), None);
    }

    #[test]
    fn test_product_key_parse_and_display() {
        let key = ProductKey::parse("K1:A100").unwrap();
        assert_eq!(key, ProductKey::new("K1", "A100"));
        assert_eq!(key.to_string(), "K1:A100");

        let monthly = ProductKey::parse("K2:3:B7").unwrap();
        assert_eq!(monthly.month.as_deref(), Some("3"));
        assert_eq!(monthly.to_string(), "K2:3:B7");

        assert!(ProductKey::parse("nocolon").is_none());
        assert!(ProductKey::parse(":A1").is_none());
    }

    #[test]
    fn test_filter_value_sentinel() {
        assert_eq!(FilterValue::parse("All"), FilterValue::All);
        assert_eq!(FilterValue::parse(""), FilterValue::All);
        assert_eq!(FilterValue::parse("Team A"), FilterValue::Only("Team A".to_string()));
        assert!(FilterValue::All.matches("anything"));
        assert!(!FilterValue::Only("x".to_string()).matches("y"));
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle(ProductKey::new("K1", "A")));
        assert!(selection.contains(&ProductKey::new("K1", "A")));
        assert!(!selection.toggle(ProductKey::new("K1", "A")));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_toggle_all() {
        let visible = vec![ProductKey::new("K1", "A"), ProductKey::new("K1", "B")];
        let mut selection = SelectionSet::new();
        selection.insert(ProductKey::new("K1", "A"));
        selection.insert(ProductKey::new("K2", "Z"));

        // Partially selected: everything visible gets selected.
        selection.toggle_all(&visible);
        assert_eq!(selection.len(), 3);

        // Fully selected: visible keys are cleared, others stay.
        selection.toggle_all(&visible);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&ProductKey::new("K2", "Z")));
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!(AggregationGranularity::parse("monthly"), Some(AggregationGranularity::Monthly));
        assert_eq!(AggregationGranularity::parse("All"), Some(AggregationGranularity::AllTime));
        assert_eq!(AggregationGranularity::parse("weekly"), None);
    }
}
