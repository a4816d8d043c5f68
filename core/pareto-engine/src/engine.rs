//! FILENAME: core/pareto-engine/src/engine.rs
//! Pareto Engine - Ranks aggregated products and computes cumulative ratios.
//!
//! Algorithm:
//! 1. Restrict the aggregated products (categorical filter or identity selection)
//! 2. Stable sort by quantity, descending
//! 3. One forward pass accumulating quantity and the ratio to the set total
//!
//! Both the filtered view and the selection view go through
//! `rank_products`, so their ordering and ratios are computed identically.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::cache::AggregatedProduct;
use crate::definition::{ProductFilter, SelectionSet, FILTER_ALL};
use crate::view::{CostTotals, FilterOptions, ParetoView, RankedProduct, SelectionView};

// ============================================================================
// FILTERING
// ============================================================================

/// True when the product passes every categorical restriction.
pub fn matches_filter(product: &AggregatedProduct, filter: &ProductFilter) -> bool {
    filter.partition.matches(product.partition())
        && filter.team.matches(&product.team)
        && filter.category.matches(&product.category)
}

// ============================================================================
// RANKING
// ============================================================================

/// Descending by quantity. `total_cmp` keeps the order total even for
/// values that slipped through as NaN.
fn compare_quantity_desc(a: &AggregatedProduct, b: &AggregatedProduct) -> Ordering {
    b.quantity().total_cmp(&a.quantity())
}

/// Sorts and cumulates a candidate set.
///
/// `slice::sort_by` is stable, so equal quantities keep the order in which
/// they were passed in. The ratio denominator is the total quantity of the
/// whole candidate set; a zero total yields 0 for every row.
pub fn rank_products(mut candidates: Vec<&AggregatedProduct>) -> Vec<RankedProduct> {
    candidates.sort_by(|a, b| compare_quantity_desc(a, b));

    let total: f64 = candidates.iter().map(|p| p.quantity()).sum();
    let mut running = 0.0;

    candidates
        .into_iter()
        .enumerate()
        .map(|(idx, product)| {
            running += product.quantity();
            RankedProduct {
                rank: idx + 1,
                product: product.clone(),
                cumulative_quantity: running,
                cumulative_ratio_percent: if total == 0.0 {
                    0.0
                } else {
                    running / total * 100.0
                },
            }
        })
        .collect()
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Filters, ranks and summarizes the aggregated products.
/// The source slice is never modified.
pub fn calculate_pareto(products: &[AggregatedProduct], filter: &ProductFilter) -> ParetoView {
    let candidates: Vec<&AggregatedProduct> = products
        .iter()
        .filter(|p| matches_filter(p, filter))
        .collect();

    let rows = rank_products(candidates);
    let total_quantity = rows.last().map(|r| r.cumulative_quantity).unwrap_or(0.0);
    let core_item_count = rows.iter().filter(|r| r.is_core_item()).count();

    ParetoView {
        rows,
        total_quantity,
        core_item_count,
    }
}

/// Ranks just the selected products and totals them.
pub fn select_subset(products: &[AggregatedProduct], selection: &SelectionSet) -> SelectionView {
    let candidates: Vec<&AggregatedProduct> = products
        .iter()
        .filter(|p| selection.contains(&p.key))
        .collect();

    let totals = CostTotals::from_products(candidates.iter().copied());
    let rows = rank_products(candidates);

    SelectionView { rows, totals }
}

/// Distinct filter values: partitions over everything, teams within the
/// partition filter, categories within partition and team filters.
/// Empty values are dropped; each list is sorted and starts with "All".
pub fn filter_options(products: &[AggregatedProduct], filter: &ProductFilter) -> FilterOptions {
    let partitions: BTreeSet<&str> = products.iter().map(|p| p.partition()).collect();

    let in_partition = || {
        products
            .iter()
            .filter(|p| filter.partition.matches(p.partition()))
    };

    let teams: BTreeSet<&str> = in_partition()
        .map(|p| p.team.as_str())
        .filter(|t| !t.is_empty())
        .collect();

    let categories: BTreeSet<&str> = in_partition()
        .filter(|p| filter.team.matches(&p.team))
        .map(|p| p.category.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    FilterOptions {
        partitions: with_all_sentinel(partitions),
        teams: with_all_sentinel(teams),
        categories: with_all_sentinel(categories),
    }
}

fn with_all_sentinel(values: BTreeSet<&str>) -> Vec<String> {
    std::iter::once(FILTER_ALL)
        .chain(values)
        .map(str::to_string)
        .collect()
}
