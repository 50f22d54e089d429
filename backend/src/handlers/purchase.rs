//! Purchase handlers
//!
//! Reads go through [`PurchaseService`]; every write goes through the stock engine.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase::{PurchaseDetail, PurchaseFilter, PurchaseInput, PurchaseSummary};
use crate::services::stock::{PurchaseReceipt, PurchaseRemoval, PurchaseRevision};
use crate::services::{PurchaseService, StockEngine};
use crate::AppState;
use shared::ListResponse;

/// List purchases of every user
pub async fn list_purchases(
    State(state): State<AppState>,
    Query(filter): Query<PurchaseFilter>,
) -> AppResult<Json<ListResponse<PurchaseDetail>>> {
    let service = PurchaseService::new(state.db.clone());
    let purchases = service.list_purchases(&filter).await?;
    Ok(Json(purchases.into()))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseDetail>> {
    let service = PurchaseService::new(state.db.clone());
    let purchase = service.get_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

pub async fn get_purchase_summary(
    State(state): State<AppState>,
    Query(filter): Query<PurchaseFilter>,
) -> AppResult<Json<PurchaseSummary>> {
    let service = PurchaseService::new(state.db.clone());
    let summary = service.get_summary(&filter).await?;
    Ok(Json(summary))
}

pub async fn create_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<PurchaseInput>,
) -> AppResult<(StatusCode, Json<PurchaseReceipt>)> {
    let engine = StockEngine::new(state.db.clone());
    let receipt = engine.record_purchase(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn update_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<PurchaseInput>,
) -> AppResult<Json<PurchaseRevision>> {
    let engine = StockEngine::new(state.db.clone());
    let revision = engine.update_purchase(user.id, purchase_id, input).await?;
    Ok(Json(revision))
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseRemoval>> {
    let engine = StockEngine::new(state.db.clone());
    let removal = engine.delete_purchase(user.id, purchase_id).await?;
    Ok(Json(removal))
}
