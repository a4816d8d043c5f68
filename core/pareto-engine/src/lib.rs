//! FILENAME: core/pareto-engine/src/lib.rs
//! Aggregation and ABC/Pareto ranking for manufacturing cost records.
//!
//! This crate is a pure, synchronous transform: raw spreadsheet rows go in,
//! ranked products come out. It performs no I/O and keeps no state between
//! calls.
//!
//! Layers:
//! - `definition`: Input shapes and configuration (what the analysis IS)
//! - `cache`: Per-run accumulation keyed by product (HOW rows collapse)
//! - `view`: Ranked output and export layout (WHAT we hand out)
//! - `engine`: Filtering, sorting and cumulative ratios (HOW we rank)

pub mod definition;
pub mod cache;
pub mod view;
pub mod engine;

pub use definition::*;
pub use cache::{
    aggregate_partitions, format_date_range, parse_number, sanitize_partition_label,
    AggregatedProduct, CostFigures, ProductAccumulator, ProductCache,
};
pub use view::*;
pub use engine::{calculate_pareto, filter_options, matches_filter, rank_products, select_subset};
