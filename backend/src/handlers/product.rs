//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::today;
use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductView, UpdateProductInput};
use crate::services::{with_timeout, ProductService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductSearchQuery {
    /// Matches name or category, case-insensitive
    pub search: Option<String>,
}

/// List products, optionally filtered by a search term
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> AppResult<Json<Vec<ProductView>>> {
    let service = ProductService::new(state.db);
    let products = with_timeout(
        state.config.request_timeout(),
        "products.list",
        service.list(query.search.as_deref()),
    )
    .await?;

    let today = today();
    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductView::new(p, today))
            .collect(),
    ))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    let product =
        with_timeout(state.config.request_timeout(), "products.get", service.get(product_id))
            .await?;
    Ok(Json(ProductView::new(product, today())))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    let service = ProductService::new(state.db);
    let product =
        with_timeout(state.config.request_timeout(), "products.create", service.create(input))
            .await?;
    Ok((StatusCode::CREATED, Json(ProductView::new(product, today()))))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    let product = with_timeout(
        state.config.request_timeout(),
        "products.update",
        service.update(product_id, input),
    )
    .await?;
    Ok(Json(ProductView::new(product, today())))
}

/// Delete a product without movements
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    with_timeout(
        state.config.request_timeout(),
        "products.delete",
        service.delete(product_id),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
