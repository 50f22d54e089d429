//! Stock counter handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{AdjustStockInput, AdjustmentFilter, StockAdjustment, StockCounter, StockDrift};
use crate::services::StockEngine;
use crate::AppState;
use shared::ListResponse;

pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<ListResponse<StockCounter>>> {
    let engine = StockEngine::new(state.db.clone());
    let counters = engine.list_stock().await?;
    Ok(Json(counters.into()))
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<StockCounter>> {
    let engine = StockEngine::new(state.db.clone());
    let counter = engine.get_stock(product_id).await?;
    Ok(Json(counter))
}

/// Manual correction of a counter, written to the audit log
pub async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<(StatusCode, Json<StockAdjustment>)> {
    let engine = StockEngine::new(state.db.clone());
    let adjustment = engine.adjust_stock(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

pub async fn list_adjustments(
    State(state): State<AppState>,
    Query(filter): Query<AdjustmentFilter>,
) -> AppResult<Json<ListResponse<StockAdjustment>>> {
    let engine = StockEngine::new(state.db.clone());
    let adjustments = engine.list_adjustments(&filter).await?;
    Ok(Json(adjustments.into()))
}

/// Products whose counter disagrees with the ledgers
pub async fn reconcile_stock(State(state): State<AppState>) -> AppResult<Json<ListResponse<StockDrift>>> {
    let engine = StockEngine::new(state.db.clone());
    let drift = engine.reconcile().await?;
    Ok(Json(drift.into()))
}
