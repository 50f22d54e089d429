//! Profit record handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profit::{ProfitFilter, ProfitInput, ProfitRecord, ProfitSummary};
use crate::services::ProfitService;
use crate::AppState;
use shared::ListResponse;

pub async fn create_profit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ProfitInput>,
) -> AppResult<(StatusCode, Json<ProfitRecord>)> {
    let service = ProfitService::new(state.db.clone());
    let profit = service.create_profit(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(profit)))
}

pub async fn list_profits(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ProfitFilter>,
) -> AppResult<Json<ListResponse<ProfitRecord>>> {
    let service = ProfitService::new(state.db.clone());
    let profits = service.list_profits(user.id, &filter).await?;
    Ok(Json(profits.into()))
}

pub async fn get_profit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profit_id): Path<Uuid>,
) -> AppResult<Json<ProfitRecord>> {
    let service = ProfitService::new(state.db.clone());
    let profit = service.get_profit(user.id, profit_id).await?;
    Ok(Json(profit))
}

pub async fn update_profit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profit_id): Path<Uuid>,
    Json(input): Json<ProfitInput>,
) -> AppResult<Json<ProfitRecord>> {
    let service = ProfitService::new(state.db.clone());
    let profit = service.update_profit(user.id, profit_id, input).await?;
    Ok(Json(profit))
}

/// Delete a profit record and return what was removed
pub async fn delete_profit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profit_id): Path<Uuid>,
) -> AppResult<Json<ProfitRecord>> {
    let service = ProfitService::new(state.db.clone());
    let profit = service.delete_profit(user.id, profit_id).await?;
    Ok(Json(profit))
}

pub async fn get_profit_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ProfitFilter>,
) -> AppResult<Json<ProfitSummary>> {
    let service = ProfitService::new(state.db.clone());
    let summary = service.get_summary(user.id, &filter).await?;
    Ok(Json(summary))
}
