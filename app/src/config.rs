//! FILENAME: app/src/config.rs
// PURPOSE: Command-line and environment configuration.
// CONTEXT: Every value can come from a flag; source, ranges and log file
//          also fall back to COST_ABC_* environment variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pareto_engine::{AggregationGranularity, FilterValue, ProductFilter, ProductKey, SelectionSet};
use persistence::{ExportKind, SourceRange, DEFAULT_SOURCE_RANGES};

use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "cost-abc")]
#[command(about = "Aggregate manufacturing cost rows and rank products by ABC/Pareto")]
pub struct Cli {
    /// Source workbook (.xlsx) or CSV file
    #[arg(long, global = true, env = "COST_ABC_SOURCE")]
    pub source: Option<PathBuf>,

    /// Sheet ranges to read, e.g. "K1!A2:S,K2!A2:S"
    #[arg(long, global = true, env = "COST_ABC_RANGES", value_delimiter = ',')]
    pub ranges: Vec<String>,

    /// Aggregation granularity: all-time or monthly
    #[arg(long, global = true, default_value = "all-time")]
    pub granularity: String,

    /// Also write log lines to this file
    #[arg(long, global = true, env = "COST_ABC_LOG")]
    pub log_file: Option<PathBuf>,

    /// Emit debug log lines
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print aggregated products as JSON
    Aggregate,
    /// Print the ranked Pareto view
    Pareto {
        #[command(flatten)]
        filter: FilterArgs,
        /// Render a plain-text table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Print the values available for each filter
    Options {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export a selection of products to CSV or XLSX
    Export {
        /// Selected products as PARTITION:CODE (or PARTITION:MONTH:CODE).
        /// Codes containing ':' or ',' need --select-json.
        #[arg(long = "select", value_delimiter = ',')]
        select: Vec<String>,
        /// Selected products as a JSON array of keys,
        /// e.g. '[{"partition":"K1","code":"A:1"}]'
        #[arg(long = "select-json", conflicts_with = "select")]
        select_json: Option<String>,
        /// Select every product visible under the filters instead
        #[arg(long)]
        all_visible: bool,
        #[command(flatten)]
        filter: FilterArgs,
        /// csv or xlsx
        #[arg(long, default_value = "xlsx")]
        format: String,
        /// Output path (defaults to a dated file name in the working directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the analysis over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

/// Categorical filters; omitted or "All" means no restriction.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub partition: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            partition: FilterValue::from(self.partition.clone()),
            team: FilterValue::from(self.team.clone()),
            category: FilterValue::from(self.category.clone()),
        }
    }
}

/// Resolved settings for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: PathBuf,
    pub ranges: Vec<SourceRange>,
    pub granularity: AggregationGranularity,
}

impl AnalysisConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        AnalysisConfig {
            source: source.into(),
            ranges: SourceRange::defaults(),
            granularity: AggregationGranularity::AllTime,
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        let source = cli.source.clone().ok_or(AppError::MissingSource)?;
        if !source.exists() {
            return Err(AppError::SourceNotFound(source.display().to_string()));
        }

        Ok(AnalysisConfig {
            source,
            ranges: parse_ranges(&cli.ranges)?,
            granularity: parse_granularity(&cli.granularity)?,
        })
    }
}

/// Parses range specs; an empty list means the default factory sheets.
pub fn parse_ranges(specs: &[String]) -> Result<Vec<SourceRange>, AppError> {
    let specs: Vec<&str> = specs
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if specs.is_empty() {
        return DEFAULT_SOURCE_RANGES
            .iter()
            .map(|spec| spec.parse().map_err(AppError::from))
            .collect();
    }

    specs
        .into_iter()
        .map(|spec| spec.parse().map_err(AppError::from))
        .collect()
}

pub fn parse_granularity(value: &str) -> Result<AggregationGranularity, AppError> {
    AggregationGranularity::parse(value).ok_or_else(|| {
        AppError::InvalidArgument(format!(
            "unknown granularity '{}' (expected all-time or monthly)",
            value
        ))
    })
}

pub fn parse_export_kind(value: &str) -> Result<ExportKind, AppError> {
    ExportKind::parse(value).ok_or_else(|| {
        AppError::InvalidArgument(format!("unknown export format '{}' (expected csv or xlsx)", value))
    })
}

pub fn parse_selection(specs: &[String]) -> Result<SelectionSet, AppError> {
    specs
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|spec| {
            ProductKey::parse(spec).ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "invalid product key '{}' (expected PARTITION:CODE)",
                    spec
                ))
            })
        })
        .collect()
}

/// Parses a JSON array of `{partition, month?, code}` keys.
pub fn parse_selection_json(json: &str) -> Result<SelectionSet, AppError> {
    let keys: Vec<ProductKey> = serde_json::from_str(json)?;
    Ok(keys.into_iter().collect())
}
