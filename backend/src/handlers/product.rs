//! Product registry handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{Product, ProductInput};
use crate::services::ProductService;
use crate::AppState;
use shared::ListResponse;

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<ListResponse<Product>>> {
    let service = ProductService::new(state.db.clone());
    let products = service.list_products().await?;
    Ok(Json(products.into()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db.clone());
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = ProductService::new(state.db.clone());
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db.clone());
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product nothing references
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db.clone());
    service.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
