//! FILENAME: app/src/api_types.rs
// PURPOSE: Request/response types for the CLI JSON output and the HTTP API.
// CONTEXT: All structs use camelCase serialization for JavaScript interoperability.

use serde::{Deserialize, Serialize};

use pareto_engine::{
    AggregatedProduct, CostFigures, CostTotals, FilterOptions, ParetoView, ProductKey,
    RankedProduct, SelectionView,
};

/// One aggregated product, flattened for table rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub partition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub code: String,
    pub name: String,
    pub team: String,
    pub category: String,
    pub date_range: String,
    pub occurrence_count: u32,
    #[serde(flatten)]
    pub figures: CostFigures,
}

impl From<&AggregatedProduct> for ProductData {
    fn from(p: &AggregatedProduct) -> Self {
        ProductData {
            partition: p.key.partition.clone(),
            month: p.key.month.clone(),
            code: p.key.code.clone(),
            name: p.name.clone(),
            team: p.team.clone(),
            category: p.category.clone(),
            date_range: p.date_range.clone(),
            occurrence_count: p.occurrence_count,
            figures: p.figures,
        }
    }
}

/// Response of `aggregate` / `GET /api/data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub message: String,
    pub count: usize,
    pub data: Vec<ProductData>,
}

impl DataResponse {
    pub fn from_products(products: &[AggregatedProduct]) -> Self {
        DataResponse {
            message: "ok".to_string(),
            count: products.len(),
            data: products.iter().map(ProductData::from).collect(),
        }
    }
}

/// A ranked row with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoRowData {
    pub rank: usize,
    #[serde(flatten)]
    pub product: ProductData,
    pub cumulative_quantity: f64,
    pub cumulative_ratio_percent: f64,
    pub abc_class: String,
    pub is_core_item: bool,
}

impl From<&RankedProduct> for ParetoRowData {
    fn from(r: &RankedProduct) -> Self {
        ParetoRowData {
            rank: r.rank,
            product: ProductData::from(&r.product),
            cumulative_quantity: r.cumulative_quantity,
            cumulative_ratio_percent: r.cumulative_ratio_percent,
            abc_class: r.abc_class().as_str().to_string(),
            is_core_item: r.is_core_item(),
        }
    }
}

/// Response of `pareto` / `GET /api/pareto`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoResponse {
    pub count: usize,
    pub total_quantity: f64,
    pub core_item_count: usize,
    pub rows: Vec<ParetoRowData>,
}

impl From<&ParetoView> for ParetoResponse {
    fn from(view: &ParetoView) -> Self {
        ParetoResponse {
            count: view.rows.len(),
            total_quantity: view.total_quantity,
            core_item_count: view.core_item_count,
            rows: view.rows.iter().map(ParetoRowData::from).collect(),
        }
    }
}

/// Body of `POST /api/selection` and `POST /api/export`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub keys: Vec<ProductKey>,
}

/// Footer record over a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsData {
    pub product_count: usize,
    pub occurrence_count: u64,
    #[serde(flatten)]
    pub figures: CostFigures,
}

impl From<&CostTotals> for TotalsData {
    fn from(t: &CostTotals) -> Self {
        TotalsData {
            product_count: t.product_count,
            occurrence_count: t.occurrence_count,
            figures: t.figures,
        }
    }
}

/// Response of `POST /api/selection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub count: usize,
    pub rows: Vec<ParetoRowData>,
    pub totals: TotalsData,
}

impl From<&SelectionView> for SelectionResponse {
    fn from(view: &SelectionView) -> Self {
        SelectionResponse {
            count: view.rows.len(),
            rows: view.rows.iter().map(ParetoRowData::from).collect(),
            totals: TotalsData::from(&view.totals),
        }
    }
}

/// Response of `options` / `GET /api/options`.
pub type OptionsResponse = FilterOptions;

/// Error body for failed HTTP requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
