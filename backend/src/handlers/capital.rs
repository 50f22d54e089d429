//! Capital investment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::capital::{CapitalFilter, CapitalInput, CapitalInvestment, CapitalSummary, MyInvestments};
use crate::services::CapitalService;
use crate::AppState;
use shared::ListResponse;

pub async fn create_investment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CapitalInput>,
) -> AppResult<(StatusCode, Json<CapitalInvestment>)> {
    let service = CapitalService::new(state.db.clone());
    let investment = service.create_investment(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

/// List investments of every investor
pub async fn list_investments(
    State(state): State<AppState>,
    Query(filter): Query<CapitalFilter>,
) -> AppResult<Json<ListResponse<CapitalInvestment>>> {
    let service = CapitalService::new(state.db.clone());
    let investments = service.list_investments(&filter).await?;
    Ok(Json(investments.into()))
}

pub async fn my_investments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<MyInvestments>> {
    let service = CapitalService::new(state.db.clone());
    let mine = service.my_investments(user.id).await?;
    Ok(Json(mine))
}

pub async fn get_investment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(investment_id): Path<Uuid>,
) -> AppResult<Json<CapitalInvestment>> {
    let service = CapitalService::new(state.db.clone());
    let investment = service.get_investment(user.id, investment_id).await?;
    Ok(Json(investment))
}

pub async fn update_investment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(investment_id): Path<Uuid>,
    Json(input): Json<CapitalInput>,
) -> AppResult<Json<CapitalInvestment>> {
    let service = CapitalService::new(state.db.clone());
    let investment = service.update_investment(user.id, investment_id, input).await?;
    Ok(Json(investment))
}

pub async fn delete_investment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(investment_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CapitalService::new(state.db.clone());
    service.delete_investment(user.id, investment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_capital_summary(
    State(state): State<AppState>,
    Query(filter): Query<CapitalFilter>,
) -> AppResult<Json<CapitalSummary>> {
    let service = CapitalService::new(state.db.clone());
    let summary = service.get_summary(&filter).await?;
    Ok(Json(summary))
}
