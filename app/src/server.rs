//! FILENAME: app/src/server.rs
// PURPOSE: HTTP surface over the analysis commands.
// CONTEXT: Handlers run the blocking file work on tokio's blocking pool and
//          answer with the camelCase types from api_types.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use pareto_engine::{FilterValue, ProductFilter, SelectionSet};
use persistence::{default_export_file_name, ExportKind};

use crate::api_types::{
    DataResponse, ErrorResponse, OptionsResponse, ParetoResponse, SelectionRequest,
    SelectionResponse,
};
use crate::commands;
use crate::config::{parse_export_kind, AnalysisConfig};
use crate::error::AppError;
use crate::{log_error, log_info};

pub type SharedConfig = Arc<AnalysisConfig>;

// ============================================================================
// ERRORS
// ============================================================================

/// An [`AppError`] rendered as a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::SourceNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log_error!("HTTP", "{} {}", status.as_u16(), self.0);
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Task(e.to_string()))?;
    Ok(result?)
}

// ============================================================================
// QUERY TYPES
// ============================================================================

/// `?partition=&team=&category=`; missing or "All" means unfiltered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub partition: Option<String>,
    pub team: Option<String>,
    pub category: Option<String>,
}

impl FilterQuery {
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            partition: FilterValue::from(self.partition.clone()),
            team: FilterValue::from(self.team.clone()),
            category: FilterValue::from(self.category.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn get_data(State(config): State<SharedConfig>) -> Result<Json<DataResponse>, ApiError> {
    let products = run_blocking(move || commands::aggregate_command(&config)).await?;
    Ok(Json(DataResponse::from_products(&products)))
}

pub async fn get_pareto(
    State(config): State<SharedConfig>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<ParetoResponse>, ApiError> {
    let filter = query.to_filter();
    let view = run_blocking(move || commands::pareto_command(&config, &filter)).await?;
    Ok(Json(ParetoResponse::from(&view)))
}

pub async fn get_options(
    State(config): State<SharedConfig>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let filter = query.to_filter();
    let options = run_blocking(move || commands::options_command(&config, &filter)).await?;
    Ok(Json(options))
}

pub async fn post_selection(
    State(config): State<SharedConfig>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let selection: SelectionSet = request.keys.into_iter().collect();
    let view = run_blocking(move || commands::selection_command(&config, &selection)).await?;
    Ok(Json(SelectionResponse::from(&view)))
}

/// Returns the selection as a file download (`?format=csv|xlsx`, default xlsx).
pub async fn post_export(
    State(config): State<SharedConfig>,
    Query(query): Query<ExportQuery>,
    Json(request): Json<SelectionRequest>,
) -> Result<Response, ApiError> {
    let kind = match query.format.as_deref() {
        Some(format) => parse_export_kind(format)?,
        None => ExportKind::Xlsx,
    };
    if request.keys.is_empty() {
        return Err(AppError::InvalidArgument("nothing selected for export".to_string()).into());
    }

    let selection: SelectionSet = request.keys.into_iter().collect();
    let bytes = run_blocking(move || commands::export_bytes(&config, &selection, kind)).await?;

    let file_name = default_export_file_name(kind, chrono::Local::now().date_naive());
    let headers = [
        (header::CONTENT_TYPE, kind.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, bytes).into_response())
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(config: SharedConfig) -> Router {
    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/pareto", get(get_pareto))
        .route("/api/options", get(get_options))
        .route("/api/selection", post(post_selection))
        .route("/api/export", post(post_export))
        .with_state(config)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(config: AnalysisConfig, addr: &str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_info!(
        "HTTP",
        "serving {} on http://{}",
        config.source.display(),
        listener.local_addr()?
    );
    axum::serve(listener, router(Arc::new(config))).await?;
    Ok(())
}
