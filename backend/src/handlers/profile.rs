//! HTTP handlers for user management (administrators only)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::Profile;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profile::{ProfileListItem, ProfileQuery, UpdateProfileInput};
use crate::services::{with_timeout, ProfileService};
use crate::AppState;

/// List profiles, optionally by status
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<Vec<ProfileListItem>>> {
    let service = ProfileService::new(state.db);
    let profiles =
        with_timeout(state.config.request_timeout(), "profiles.list", service.list(query)).await?;
    Ok(Json(profiles))
}

/// Change another account's role or status
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(profile_id): Path<Uuid>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<Profile>> {
    let service = ProfileService::new(state.db);
    let profile = with_timeout(
        state.config.request_timeout(),
        "profiles.update",
        service.update(current_user.0.user_id, profile_id, input),
    )
    .await?;
    Ok(Json(profile))
}
