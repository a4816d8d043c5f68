//! FILENAME: core/pareto-engine/src/cache.rs
//! Product Cache - Collapses raw rows into one record per product.
//!
//! The cache is designed for:
//! - A single O(n) pass over the raw rows of every partition
//! - Exact field-wise sums (no recomputation of derived totals)
//! - Deterministic output order (first-seen order of keys)
//!
//! Architecture:
//! - Each distinct `ProductKey` is interned once and mapped to a slot index
//! - Slots own a mutable `ProductAccumulator`
//! - `snapshot()` renders the slots into immutable `AggregatedProduct`s
//!
//! Malformed input never fails: unparseable numbers become 0, a missing
//! code becomes `MISSING_CODE`, empty dates are ignored.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::definition::{
    columns, month_of, AggregationGranularity, ProductKey, RawRow, SourcePartition,
    DATE_RANGE_EMPTY, DATE_RANGE_SEPARATOR, MISSING_CODE, UNKNOWN_PARTITION,
};

// ============================================================================
// CELL PARSING
// ============================================================================

/// Parses a numeric cell. Thousands separators are stripped; anything that
/// still fails to parse (or is not finite) counts as 0.
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Removes quote characters and whitespace from a partition label
/// (sheet names come back as `'K1'` from some sources).
pub fn sanitize_partition_label(raw: &str) -> String {
    let clean: String = raw
        .chars()
        .filter(|c| *c != '\'' && *c != '"' && !c.is_whitespace())
        .collect();
    if clean.is_empty() {
        UNKNOWN_PARTITION.to_string()
    } else {
        clean
    }
}

/// Renders a sorted date set as "-", "d" or "first~last".
pub fn format_date_range(dates: &BTreeSet<String>) -> String {
    match (dates.first(), dates.last()) {
        (None, _) | (_, None) => DATE_RANGE_EMPTY.to_string(),
        (Some(first), Some(last)) if first == last => first.clone(),
        (Some(first), Some(last)) => format!("{}{}{}", first, DATE_RANGE_SEPARATOR, last),
    }
}

// ============================================================================
// COST FIGURES
// ============================================================================

/// The thirteen numeric fields accumulated per product.
///
/// `material_total` and `processing_total` are summed from their own source
/// columns and are never recomputed from the sub-components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostFigures {
    pub quantity: f64,

    pub raw_material: f64,
    pub sub_material: f64,
    pub packaging: f64,
    pub consumable: f64,
    pub material_total: f64,

    pub depreciation: f64,
    pub direct_labor: f64,
    pub indirect_labor: f64,
    pub utility: f64,
    pub other_expense: f64,
    pub processing_total: f64,

    pub total_cost: f64,
}

impl CostFigures {
    pub fn from_row(row: &RawRow) -> Self {
        let num = |idx: usize| parse_number(row.cell(idx));
        CostFigures {
            quantity: num(columns::QUANTITY),
            raw_material: num(columns::RAW_MATERIAL),
            sub_material: num(columns::SUB_MATERIAL),
            packaging: num(columns::PACKAGING),
            consumable: num(columns::CONSUMABLE),
            material_total: num(columns::MATERIAL_TOTAL),
            depreciation: num(columns::DEPRECIATION),
            direct_labor: num(columns::DIRECT_LABOR),
            indirect_labor: num(columns::INDIRECT_LABOR),
            utility: num(columns::UTILITY),
            other_expense: num(columns::OTHER_EXPENSE),
            processing_total: num(columns::PROCESSING_TOTAL),
            total_cost: num(columns::TOTAL_COST),
        }
    }

    /// Field-wise addition.
    pub fn add(&mut self, other: &CostFigures) {
        self.quantity += other.quantity;
        self.raw_material += other.raw_material;
        self.sub_material += other.sub_material;
        self.packaging += other.packaging;
        self.consumable += other.consumable;
        self.material_total += other.material_total;
        self.depreciation += other.depreciation;
        self.direct_labor += other.direct_labor;
        self.indirect_labor += other.indirect_labor;
        self.utility += other.utility;
        self.other_expense += other.other_expense;
        self.processing_total += other.processing_total;
        self.total_cost += other.total_cost;
    }
}

// ============================================================================
// AGGREGATED PRODUCT
// ============================================================================

/// One finished record per distinct product key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedProduct {
    pub key: ProductKey,
    pub name: String,
    pub team: String,
    pub category: String,
    pub figures: CostFigures,
    /// Number of raw rows merged into this product.
    pub occurrence_count: u32,
    /// "-", a single date, or "first~last".
    pub date_range: String,
}

impl AggregatedProduct {
    pub fn partition(&self) -> &str {
        &self.key.partition
    }

    pub fn code(&self) -> &str {
        &self.key.code
    }

    pub fn quantity(&self) -> f64 {
        self.figures.quantity
    }
}

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Mutable per-key state while a run is in progress.
#[derive(Debug, Clone)]
pub struct ProductAccumulator {
    name: String,
    team: String,
    category: String,
    figures: CostFigures,
    occurrence_count: u32,
    dates: BTreeSet<String>,
}

impl ProductAccumulator {
    /// Starts a new accumulator from the first row seen for a key.
    fn from_first_row(row: &RawRow) -> Self {
        let mut acc = ProductAccumulator {
            name: row.cell(columns::NAME).to_string(),
            team: row.cell(columns::TEAM).to_string(),
            category: row.cell(columns::CATEGORY).to_string(),
            figures: CostFigures::from_row(row),
            occurrence_count: 1,
            dates: BTreeSet::new(),
        };
        acc.observe_date(row.cell(columns::DATE));
        acc
    }

    /// Folds a subsequent row into the totals. Descriptive fields are kept.
    fn accumulate(&mut self, row: &RawRow) {
        self.figures.add(&CostFigures::from_row(row));
        self.occurrence_count += 1;
        self.observe_date(row.cell(columns::DATE));
    }

    fn observe_date(&mut self, date: &str) {
        if !date.is_empty() {
            self.dates.insert(date.to_string());
        }
    }

    pub fn figures(&self) -> &CostFigures {
        &self.figures
    }

    pub fn occurrence_count(&self) -> u32 {
        self.occurrence_count
    }

    fn finish(&self, key: &ProductKey) -> AggregatedProduct {
        AggregatedProduct {
            key: key.clone(),
            name: self.name.clone(),
            team: self.team.clone(),
            category: self.category.clone(),
            figures: self.figures,
            occurrence_count: self.occurrence_count,
            date_range: format_date_range(&self.dates),
        }
    }
}

// ============================================================================
// PRODUCT CACHE
// ============================================================================

/// Run-scoped mapping from product key to accumulator.
///
/// A cache is owned by exactly one aggregation run; nothing outside the run
/// observes it until `snapshot()` is taken.
#[derive(Debug, Clone)]
pub struct ProductCache {
    granularity: AggregationGranularity,

    /// Key -> slot index (interning map).
    key_to_slot: FxHashMap<ProductKey, usize>,

    /// Slots in first-seen order.
    slots: Vec<(ProductKey, ProductAccumulator)>,

    /// Raw rows consumed so far.
    rows_seen: usize,
}

impl ProductCache {
    pub fn new(granularity: AggregationGranularity) -> Self {
        ProductCache {
            granularity,
            key_to_slot: FxHashMap::default(),
            slots: Vec::new(),
            rows_seen: 0,
        }
    }

    /// Builds the composite key for a row in a (sanitized) partition.
    pub fn key_for(&self, partition: &str, row: &RawRow) -> ProductKey {
        let code = match row.cell(columns::CODE) {
            "" => MISSING_CODE,
            code => code,
        };
        let key = ProductKey::new(partition, code);
        match self.granularity {
            AggregationGranularity::AllTime => key,
            AggregationGranularity::Monthly => key.with_month(month_of(row.cell(columns::DATE))),
        }
    }

    /// Adds every row of a partition.
    pub fn add_partition(&mut self, partition: &SourcePartition) {
        let label = sanitize_partition_label(&partition.label);
        self.reserve(partition.rows.len());
        for row in &partition.rows {
            self.add_sanitized_row(&label, row);
        }
    }

    /// Adds a single row; `partition_label` is sanitized first.
    pub fn add_row(&mut self, partition_label: &str, row: &RawRow) {
        let label = sanitize_partition_label(partition_label);
        self.add_sanitized_row(&label, row);
    }

    fn add_sanitized_row(&mut self, label: &str, row: &RawRow) {
        let key = self.key_for(label, row);
        self.rows_seen += 1;

        if let Some(&slot) = self.key_to_slot.get(&key) {
            self.slots[slot].1.accumulate(row);
            return;
        }

        let slot = self.slots.len();
        self.slots.push((key.clone(), ProductAccumulator::from_first_row(row)));
        self.key_to_slot.insert(key, slot);
    }

    /// Reserves capacity for roughly `additional` more rows.
    pub fn reserve(&mut self, additional: usize) {
        self.key_to_slot.reserve(additional);
        self.slots.reserve(additional);
    }

    pub fn get(&self, key: &ProductKey) -> Option<&ProductAccumulator> {
        self.key_to_slot.get(key).map(|&slot| &self.slots[slot].1)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Renders the finished products in first-seen order.
    pub fn snapshot(&self) -> Vec<AggregatedProduct> {
        self.slots.iter().map(|(key, acc)| acc.finish(key)).collect()
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Aggregates every partition from scratch.
/// Calling this twice on the same input yields identical output.
pub fn aggregate_partitions(
    partitions: &[SourcePartition],
    granularity: AggregationGranularity,
) -> Vec<AggregatedProduct> {
    let mut cache = ProductCache::new(granularity);
    for partition in partitions {
        cache.add_partition(partition);
    }
    cache.snapshot()
}
