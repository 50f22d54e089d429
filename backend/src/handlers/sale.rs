//! Sales ("stock-out") handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{SaleDetail, SaleFilter, SaleInput};
use crate::services::stock::{SaleReceipt, SaleRemoval, SaleRevision, StockSummary};
use crate::services::{SaleService, StockEngine};
use crate::AppState;
use shared::ListResponse;

pub async fn list_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<SaleFilter>,
) -> AppResult<Json<ListResponse<SaleDetail>>> {
    let service = SaleService::new(state.db.clone());
    let sales = service.list_sales(user.id, &filter).await?;
    Ok(Json(sales.into()))
}

pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleDetail>> {
    let service = SaleService::new(state.db.clone());
    let sale = service.get_sale(user.id, sale_id).await?;
    Ok(Json(sale))
}

pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<SaleInput>,
) -> AppResult<(StatusCode, Json<SaleReceipt>)> {
    let engine = StockEngine::new(state.db.clone());
    let receipt = engine.record_sale(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn update_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<SaleInput>,
) -> AppResult<Json<SaleRevision>> {
    let engine = StockEngine::new(state.db.clone());
    let revision = engine.update_sale(user.id, sale_id, input).await?;
    Ok(Json(revision))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleRemoval>> {
    let engine = StockEngine::new(state.db.clone());
    let removal = engine.delete_sale(user.id, sale_id).await?;
    Ok(Json(removal))
}

/// Stock in/out totals and availability for one product
pub async fn get_sale_summary(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<StockSummary>> {
    let engine = StockEngine::new(state.db.clone());
    let summary = engine.get_summary(product_id).await?;
    Ok(Json(summary))
}
