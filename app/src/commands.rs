//! FILENAME: app/src/commands.rs
// PURPOSE: Analysis operations shared by the CLI subcommands and the HTTP handlers.
// CONTEXT: Each call re-reads the source so the server always reflects the
//          current file contents.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use pareto_engine::{
    aggregate_partitions, calculate_pareto, filter_options, select_subset, AggregatedProduct,
    FilterOptions, ParetoView, ProductFilter, SelectionSet, SelectionView,
};
use persistence::{
    default_export_file_name, load_source, save_csv, save_xlsx, write_csv, xlsx_to_buffer,
    ExportKind,
};

use crate::config::AnalysisConfig;
use crate::error::AppError;
use crate::{log_enter, log_exit, log_info, log_warn};

// ============================================================================
// LOADING
// ============================================================================

/// Reads every configured range and aggregates the rows.
pub fn load_products(config: &AnalysisConfig) -> Result<Vec<AggregatedProduct>, AppError> {
    log_enter!("LOAD", "load_products", "source={} granularity={}", config.source.display(), config.granularity);

    if !config.source.exists() {
        return Err(AppError::SourceNotFound(config.source.display().to_string()));
    }

    let partitions = load_source(&config.source, &config.ranges)?;
    let row_count: usize = partitions.iter().map(|p| p.rows.len()).sum();
    let products = aggregate_partitions(&partitions, config.granularity);

    log_info!(
        "LOAD",
        "{} partitions, {} rows -> {} products",
        partitions.len(),
        row_count,
        products.len()
    );
    log_exit!("LOAD", "load_products");
    Ok(products)
}

// ============================================================================
// QUERIES
// ============================================================================

pub fn aggregate_command(config: &AnalysisConfig) -> Result<Vec<AggregatedProduct>, AppError> {
    load_products(config)
}

pub fn pareto_command(
    config: &AnalysisConfig,
    filter: &ProductFilter,
) -> Result<ParetoView, AppError> {
    let products = load_products(config)?;
    let view = calculate_pareto(&products, filter);
    log_info!(
        "PARETO",
        "ranked {} products, {} core items, total quantity {}",
        view.rows.len(),
        view.core_item_count,
        view.total_quantity
    );
    Ok(view)
}

pub fn options_command(
    config: &AnalysisConfig,
    filter: &ProductFilter,
) -> Result<FilterOptions, AppError> {
    let products = load_products(config)?;
    Ok(filter_options(&products, filter))
}

pub fn selection_command(
    config: &AnalysisConfig,
    selection: &SelectionSet,
) -> Result<SelectionView, AppError> {
    let products = load_products(config)?;
    let view = select_subset(&products, selection);
    if view.rows.len() < selection.len() {
        log_warn!(
            "SELECT",
            "{} of {} selected keys did not match a product",
            selection.len() - view.rows.len(),
            selection.len()
        );
    }
    Ok(view)
}

// ============================================================================
// EXPORT
// ============================================================================

/// Which products an export covers.
#[derive(Debug, Clone)]
pub enum ExportSelection {
    /// Exactly these keys.
    Keys(SelectionSet),
    /// Every product visible under the filter.
    AllVisible(ProductFilter),
}

/// Writes the selected products to `output` (or a dated default name in the
/// working directory) and returns the path written.
pub fn export_command(
    config: &AnalysisConfig,
    selection: ExportSelection,
    kind: ExportKind,
    output: Option<&Path>,
) -> Result<PathBuf, AppError> {
    log_enter!("EXPORT", "export_command", "kind={}", kind.extension());

    let products = load_products(config)?;
    let selection = match selection {
        ExportSelection::Keys(keys) => keys,
        ExportSelection::AllVisible(filter) => {
            let visible = calculate_pareto(&products, &filter);
            let mut keys = SelectionSet::new();
            keys.toggle_all(visible.rows.iter().map(|r| &r.product.key));
            keys
        }
    };

    let view = select_subset(&products, &selection);
    ensure_exportable(&view)?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_export_file_name(
            kind,
            chrono::Local::now().date_naive(),
        )),
    };

    match kind {
        ExportKind::Csv => save_csv(&path, &view.rows, &view.totals)?,
        ExportKind::Xlsx => save_xlsx(&path, &view.rows, &view.totals)?,
    }

    log_info!("EXPORT", "wrote {} rows to {}", view.rows.len(), path.display());
    log_exit!("EXPORT", "export_command");
    Ok(path)
}

/// Renders the selected products in memory, for HTTP downloads.
pub fn export_bytes(
    config: &AnalysisConfig,
    selection: &SelectionSet,
    kind: ExportKind,
) -> Result<Vec<u8>, AppError> {
    let view = selection_command(config, selection)?;
    ensure_exportable(&view)?;
    let bytes = match kind {
        ExportKind::Csv => {
            let mut buffer = Vec::new();
            write_csv(&mut buffer, &view.rows, &view.totals)?;
            buffer
        }
        ExportKind::Xlsx => xlsx_to_buffer(&view.rows, &view.totals)?,
    };
    log_info!("EXPORT", "rendered {} rows ({} bytes)", view.rows.len(), bytes.len());
    Ok(bytes)
}

/// Rejects an export in which no selected key matched a product.
fn ensure_exportable(view: &SelectionView) -> Result<(), AppError> {
    if view.rows.is_empty() {
        return Err(AppError::InvalidArgument(
            "nothing selected for export".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// TABLE RENDERING
// ============================================================================

/// Plain-text rendering of a ranked view for the terminal.
pub fn render_table(view: &ParetoView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<6}  {:<12}  {:<30}  {:>12}  {:>8}  {:<3}",
        "Rank", "Part", "Code", "Name", "Quantity", "Cum %", "ABC"
    );
    for row in &view.rows {
        let marker = if row.is_core_item() { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:>5}  {:<6}  {:<12}  {:<30}  {:>12.0}  {:>7.2}%  {}{}",
            row.rank,
            row.product.partition(),
            row.product.code(),
            truncate(&row.product.name, 30),
            row.product.quantity(),
            row.cumulative_ratio_percent,
            row.abc_class().as_str(),
            marker
        );
    }
    let _ = writeln!(
        out,
        "{} products, {} core items, total quantity {:.0}",
        view.rows.len(),
        view.core_item_count,
        view.total_quantity
    );
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
