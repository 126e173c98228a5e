//! HTTP handlers for inventory movements

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{MovementEntry, MovementType, PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{MovementFilter, RecordMovementInput, RecordedMovement};
use crate::services::{with_timeout, InventoryService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementListQuery {
    pub product_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub movement_type: Option<MovementType>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Record an inflow or outflow; the caller is the responsible user
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<(StatusCode, Json<RecordedMovement>)> {
    let service = InventoryService::new(state.db);
    let recorded = with_timeout(
        state.config.request_timeout(),
        "movements.record",
        service.record_movement(current_user.0.user_id, input),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// List movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<MovementEntry>>> {
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let filter = MovementFilter {
        product_id: query.product_id,
        movement_type: query.movement_type,
    };

    let service = InventoryService::new(state.db);
    let movements = with_timeout(
        state.config.request_timeout(),
        "movements.list",
        service.list_movements(filter, pagination),
    )
    .await?;
    Ok(Json(movements))
}
