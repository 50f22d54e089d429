//! Reporting handlers for analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::reporting::{InventoryQuery, ReportFilter, ReportingService, SalesReportQuery};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>, // "json" or "csv"
}

impl ExportQuery {
    fn wants_csv(&self) -> bool {
        self.format.as_deref() == Some("csv")
    }
}

/// Render `rows` as a CSV attachment when requested, `body` as JSON otherwise
fn respond<B: Serialize, R: Serialize>(
    export: &ExportQuery,
    filename: &'static str,
    body: &B,
    rows: &[R],
) -> AppResult<Response> {
    if export.wants_csv() {
        let csv = ReportingService::export_to_csv(rows)?;
        let disposition = format!("attachment; filename=\"{}\"", filename);
        Ok((
            [(header::CONTENT_TYPE, "text/csv".to_string()), (header::CONTENT_DISPOSITION, disposition)],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(body).into_response())
    }
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
    Query(export): Query<ExportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let dashboard = service.get_dashboard(&filter).await?;
    respond(&export, "dashboard.csv", &dashboard, &dashboard.metric_rows())
}

/// Get sales report
pub async fn get_sales_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
    Query(query): Query<SalesReportQuery>,
    Query(export): Query<ExportQuery>,
) -> AppResult<Response> {
    let group_by = query.group_by()?;
    let service = ReportingService::new(state.db.clone());
    let report = service.get_sales_report(&filter, group_by).await?;
    respond(&export, "sales.csv", &report, &report.sales_by_period)
}

/// Get inventory report
pub async fn get_inventory_report(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
    Query(export): Query<ExportQuery>,
) -> AppResult<Response> {
    let thresholds = query.thresholds(state.config.inventory.thresholds())?;
    let service = ReportingService::new(state.db.clone());
    let report = service.get_inventory_report(thresholds).await?;
    respond(&export, "inventory.csv", &report, &report.all_products)
}

/// Get profit & loss report
pub async fn get_profit_loss_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
    Query(export): Query<ExportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let report = service.get_profit_loss(&filter).await?;
    respond(&export, "profit_loss.csv", &report, &report.operating_expenses)
}

/// Get product performance report
pub async fn get_product_performance_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
    Query(export): Query<ExportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let report = service.get_product_performance(&filter).await?;
    respond(&export, "product_performance.csv", &report, &report.products)
}
