//! FILENAME: app/src/lib.rs
// PURPOSE: Entry point wiring configuration, logging and the subcommands.

#[macro_use]
pub mod logging;

pub mod api_types;
pub mod commands;
pub mod config;
pub mod error;
pub mod server;

pub use config::{AnalysisConfig, Cli, Commands, FilterArgs};
pub use error::AppError;

use std::io::Write;

use serde::Serialize;

use api_types::{DataResponse, ParetoResponse};
use commands::ExportSelection;
use config::{parse_export_kind, parse_selection, parse_selection_json};

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Runs one parsed command line to completion.
pub fn run(cli: Cli) -> Result<(), AppError> {
    logging::init(cli.verbose, cli.log_file.as_deref()).map_err(AppError::Logging)?;
    log_info!("APP", "cost-abc {} starting", env!("CARGO_PKG_VERSION"));

    let config = AnalysisConfig::from_cli(&cli)?;
    log_debug!(
        "APP",
        "source={} ranges={} granularity={}",
        config.source.display(),
        config
            .ranges
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(","),
        config.granularity
    );

    match cli.command {
        Commands::Aggregate => {
            let products = commands::aggregate_command(&config)?;
            print_json(&DataResponse::from_products(&products))
        }
        Commands::Pareto { filter, table } => {
            let view = commands::pareto_command(&config, &filter.to_filter())?;
            if table {
                print!("{}", commands::render_table(&view));
                Ok(())
            } else {
                print_json(&ParetoResponse::from(&view))
            }
        }
        Commands::Options { filter } => {
            let options = commands::options_command(&config, &filter.to_filter())?;
            print_json(&options)
        }
        Commands::Export {
            select,
            select_json,
            all_visible,
            filter,
            format,
            output,
        } => {
            let kind = parse_export_kind(&format)?;
            let selection = if all_visible {
                ExportSelection::AllVisible(filter.to_filter())
            } else if let Some(json) = select_json {
                ExportSelection::Keys(parse_selection_json(&json)?)
            } else {
                ExportSelection::Keys(parse_selection(&select)?)
            };
            let path = commands::export_command(&config, selection, kind, output.as_deref())?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Serve { addr } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(config, &addr))
        }
    }
}
