//! Authentication handlers

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::Deserialize;
use shared::Profile;

use crate::error::AppResult;
use crate::middleware::{auth::bearer_token, CurrentUser};
use crate::services::auth::{AuthTokens, Session, SignInResponse, SignUpInput, SignUpResponse};
use crate::services::{with_timeout, AuthService};
use crate::AppState;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct PasswordChangeRequest {
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct OwnProfileRequest {
    pub name: String,
}

/// Sign-up endpoint handler; the new account starts pending
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpInput>,
) -> AppResult<(StatusCode, Json<SignUpResponse>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result =
        with_timeout(state.config.request_timeout(), "auth.sign_up", auth_service.sign_up(body))
            .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Sign-in endpoint handler
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> AppResult<Json<SignInResponse>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = with_timeout(
        state.config.request_timeout(),
        "auth.sign_in",
        auth_service.sign_in(&body.email, &body.password),
    )
    .await?;

    Ok(Json(result))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = with_timeout(
        state.config.request_timeout(),
        "auth.refresh",
        auth_service.refresh_token(&body.refresh_token),
    )
    .await?;

    Ok(Json(tokens))
}

/// Revoke the caller's refresh tokens
pub async fn sign_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<StatusCode> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    with_timeout(
        state.config.request_timeout(),
        "auth.sign_out",
        auth_service.sign_out(current_user.0.user_id),
    )
    .await?;

    tracing::info!(email = %current_user.0.email, "Signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// Restore the session for the bearer token, if any.
/// Always answers; a slow profile lookup yields a signed-out session.
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<Session> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service
        .restore_session(bearer_token(&headers), state.config.session_restore_timeout())
        .await;

    Json(session)
}

/// Update the caller's display name
pub async fn update_own_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<OwnProfileRequest>,
) -> AppResult<Json<Profile>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let profile = with_timeout(
        state.config.request_timeout(),
        "auth.update_profile",
        auth_service.update_profile_name(current_user.0.user_id, &body.name),
    )
    .await?;

    Ok(Json(profile))
}

/// Change the caller's password
pub async fn update_own_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<PasswordChangeRequest>,
) -> AppResult<StatusCode> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    with_timeout(
        state.config.request_timeout(),
        "auth.update_password",
        auth_service.update_password(
            current_user.0.user_id,
            &body.password,
            &body.password_confirmation,
        ),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
