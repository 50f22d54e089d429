//! Expense handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expense::{Expense, ExpenseFilter, ExpenseInput, ExpenseSummary};
use crate::services::ExpenseService;
use crate::AppState;
use shared::ListResponse;

pub async fn create_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ExpenseInput>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let service = ExpenseService::new(state.db.clone());
    let expense = service.create_expense(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<Json<ListResponse<Expense>>> {
    let service = ExpenseService::new(state.db.clone());
    let expenses = service.list_expenses(user.id, &filter).await?;
    Ok(Json(expenses.into()))
}

pub async fn get_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<Expense>> {
    let service = ExpenseService::new(state.db.clone());
    let expense = service.get_expense(user.id, expense_id).await?;
    Ok(Json(expense))
}

pub async fn update_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(expense_id): Path<Uuid>,
    Json(input): Json<ExpenseInput>,
) -> AppResult<Json<Expense>> {
    let service = ExpenseService::new(state.db.clone());
    let expense = service.update_expense(user.id, expense_id, input).await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ExpenseService::new(state.db.clone());
    service.delete_expense(user.id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_expense_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<Json<ExpenseSummary>> {
    let service = ExpenseService::new(state.db.clone());
    let summary = service.get_summary(user.id, &filter).await?;
    Ok(Json(summary))
}
