//! FILENAME: tests/test_analysis.rs
//! Integration tests for loading, aggregation and Pareto ranking.

mod common;

use app_lib::commands::{
    aggregate_command, options_command, pareto_command, render_table, selection_command,
};
use app_lib::AppError;
use common::{FactoryFixture, TestHarness};
use pareto_engine::{AbcClass, ProductFilter, ProductKey, SelectionSet};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// AGGREGATION
// ============================================================================

#[test]
fn test_aggregate_all_time() {
    let harness = TestHarness::with_factories();
    let products = aggregate_command(&harness.config()).unwrap();

    let keys: Vec<String> = products.iter().map(|p| p.key.to_string()).collect();
    assert_eq!(
        keys,
        vec!["K1:A100", "K1:B200", "K1:C300", "K2:A100", "K2:D400", "K3:E500"]
    );

    let bolt = &products[0];
    assert_eq!(bolt.name, "Bolt");
    assert_eq!(bolt.occurrence_count, 2);
    assert_eq!(bolt.date_range, "1/5~2/3");
    assert!(approx(bolt.quantity(), 800.0));
    assert!(approx(bolt.figures.material_total, 1600.0));
    assert!(approx(bolt.figures.total_cost, 1900.0));

    let washer = &products[2];
    assert_eq!(washer.date_range, "-");
    assert_eq!(washer.category, "Plastic");
}

#[test]
fn test_same_code_in_two_factories_stays_separate() {
    let harness = TestHarness::with_factories();
    let products = aggregate_command(&harness.config()).unwrap();

    let bolts: Vec<_> = products.iter().filter(|p| p.code() == "A100").collect();
    assert_eq!(bolts.len(), 2);
    assert_eq!(bolts[0].partition(), "K1");
    assert_eq!(bolts[1].partition(), "K2");
    assert!(approx(bolts[1].quantity(), 100.0));
}

#[test]
fn test_aggregate_monthly() {
    let harness = TestHarness::with_factories();
    let products = aggregate_command(&harness.monthly_config()).unwrap();

    assert_eq!(products.len(), 7);
    let january = products
        .iter()
        .find(|p| p.key == ProductKey::new("K1", "A100").with_month(Some("1".to_string())))
        .unwrap();
    assert!(approx(january.quantity(), 500.0));
    assert_eq!(january.date_range, "1/5");

    let undated = products.iter().find(|p| p.code() == "C300").unwrap();
    assert_eq!(undated.key.month, None);
}

#[test]
fn test_quantity_is_conserved() {
    let harness = TestHarness::with_factories();
    let products = aggregate_command(&harness.config()).unwrap();
    let total: f64 = products.iter().map(|p| p.quantity()).sum();
    assert!(approx(total, FactoryFixture::TOTAL_QUANTITY));
}

// ============================================================================
// PARETO
// ============================================================================

#[test]
fn test_pareto_across_all_factories() {
    let harness = TestHarness::with_factories();
    let view = pareto_command(&harness.config(), &ProductFilter::all()).unwrap();

    assert_eq!(view.rows.len(), 6);
    assert!(approx(view.total_quantity, FactoryFixture::TOTAL_QUANTITY));
    assert_eq!(view.core_item_count, 1);

    let order: Vec<String> = view.rows.iter().map(|r| r.product.key.to_string()).collect();
    // K2:A100 and K3:E500 tie at 100 and keep first-seen order.
    assert_eq!(
        order,
        vec!["K2:D400", "K1:A100", "K1:B200", "K2:A100", "K3:E500", "K1:C300"]
    );

    assert_eq!(view.rows[0].abc_class(), AbcClass::A);
    assert_eq!(view.rows[1].abc_class(), AbcClass::B);
    assert_eq!(view.rows[4].abc_class(), AbcClass::C);
    assert!(approx(view.rows[5].cumulative_ratio_percent, 100.0));

    let ranks: Vec<usize> = view.rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_pareto_filtered_by_team_recomputes_ratios() {
    let harness = TestHarness::with_factories();
    let filter = ProductFilter::all().team("T1");
    let view = pareto_command(&harness.config(), &filter).unwrap();

    assert_eq!(view.rows.len(), 3);
    assert!(approx(view.total_quantity, 1000.0));
    assert_eq!(view.rows[0].product.key, ProductKey::new("K1", "A100"));
    assert!(approx(view.rows[1].cumulative_quantity, 900.0));
    assert!(view.rows.iter().all(|r| r.product.team == "T1"));
}

#[test]
fn test_pareto_filter_without_matches_is_empty() {
    let harness = TestHarness::with_factories();
    let filter = ProductFilter::all().partition("K9");
    let view = pareto_command(&harness.config(), &filter).unwrap();
    assert!(view.is_empty());
    assert_eq!(view.total_quantity, 0.0);
    assert_eq!(view.core_item_count, 0);
}

#[test]
fn test_render_table_lists_every_row() {
    let harness = TestHarness::with_factories();
    let view = pareto_command(&harness.config(), &ProductFilter::all()).unwrap();
    let table = render_table(&view);
    assert_eq!(table.lines().count(), view.rows.len() + 2);
    assert!(table.contains("Spring"));
}

// ============================================================================
// OPTIONS & SELECTION
// ============================================================================

#[test]
fn test_filter_options() {
    let harness = TestHarness::with_factories();
    let options = options_command(&harness.config(), &ProductFilter::all()).unwrap();
    assert_eq!(options.partitions, vec!["All", "K1", "K2", "K3"]);
    assert_eq!(options.teams, vec!["All", "T1", "T2", "T3"]);
    assert_eq!(options.categories, vec!["All", "Gear", "Metal", "Plastic", "Spring"]);

    let scoped = options_command(&harness.config(), &ProductFilter::all().partition("K2")).unwrap();
    assert_eq!(scoped.partitions, vec!["All", "K1", "K2", "K3"]);
    assert_eq!(scoped.teams, vec!["All", "T1", "T3"]);
}

#[test]
fn test_selection_totals() {
    let harness = TestHarness::with_factories();
    let selection: SelectionSet = vec![
        ProductKey::new("K1", "A100"),
        ProductKey::new("K3", "E500"),
        ProductKey::new("K9", "NOPE"),
    ]
    .into_iter()
    .collect();

    let view = selection_command(&harness.config(), &selection).unwrap();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.totals.product_count, 2);
    assert_eq!(view.totals.occurrence_count, 3);
    assert!(approx(view.totals.figures.quantity, 900.0));
    assert!(approx(view.totals.figures.total_cost, 2380.0));
    // Ratios are relative to the selection, not the whole data set.
    assert!(approx(view.rows[1].cumulative_ratio_percent, 100.0));
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_missing_sheet_is_reported() {
    let harness = TestHarness::with_factories();
    let mut config = harness.config();
    config.ranges = vec!["K7!A2:S".parse().unwrap()];
    let err = aggregate_command(&config).unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
    assert!(err.to_string().contains("K7"));
}
