//! Authentication middleware
//!
//! JWT authentication plus the approval gate that keeps pending and
//! inactive accounts out of restricted pages

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use shared::{guard_navigation, AuthState, Navigation, Page, Profile, ProfileStatus};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{with_timeout, AuthService};
use crate::AppState;

/// Authenticated user information, refreshed from the database per request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    /// `None` when the profile row is missing
    pub profile: Option<Profile>,
}

impl AuthUser {
    /// A missing profile counts as awaiting approval
    pub fn status(&self) -> ProfileStatus {
        self.profile.as_ref().map(|p| p.status).unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(Profile::is_admin)
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState::resolved(self.profile.as_ref().map(|p| p.status), true)
    }
}

/// Authentication middleware that validates JWT tokens and loads the profile
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| unauthorized("Missing or invalid Authorization header"))?
        .to_string();

    let service = AuthService::new(state.db.clone(), &state.config);
    let claims = service.validate_token(&token)?;

    let user_id =
        Uuid::parse_str(&claims.sub).map_err(|_| unauthorized("Invalid user ID in token"))?;

    // Status changes made by an administrator apply on the next request
    let profile = with_timeout(
        state.config.request_timeout(),
        "auth.load_profile",
        service.load_profile(user_id),
    )
    .await?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
        profile,
    });

    Ok(next.run(request).await)
}

/// Route layer body that rejects users who may not open `page`
pub async fn require_page(page: Page, request: Request, next: Next) -> AppResult<Response> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| unauthorized("Authentication required"))?;

    check_page_access(user, page)?;

    Ok(next.run(request).await)
}

/// Server-side counterpart of the client navigation guard
pub fn check_page_access(user: &AuthUser, page: Page) -> AppResult<()> {
    match guard_navigation(user.auth_state(), user.is_admin(), page) {
        Navigation::Allow(_) => Ok(()),
        Navigation::Redirect(redirect_to) => Err(match user.status() {
            ProfileStatus::Pending => AppError::AccountPending { redirect_to },
            ProfileStatus::Inactive => AppError::AccountInactive { redirect_to },
            ProfileStatus::Active => AppError::InsufficientPermissions,
        }),
        Navigation::Wait => Err(unauthorized("Session not restored")),
    }
}

/// Token from an `Authorization: Bearer ...` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized {
        message: message.to_string(),
        message_pt: "Não autorizado".to_string(),
    }
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn user(status: ProfileStatus, role: &str) -> AuthUser {
        let id = Uuid::new_v4();
        AuthUser {
            user_id: id,
            email: "servidor@escola.gov.br".to_string(),
            profile: Some(Profile {
                id,
                name: Some("Ana".to_string()),
                role: role.to_string(),
                status,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_pending_user_blocked_from_products() {
        let err = check_page_access(&user(ProfileStatus::Pending, "Servidor"), Page::Products)
            .unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_PENDING");
        assert!(check_page_access(&user(ProfileStatus::Pending, "Servidor"), Page::Settings).is_ok());
    }

    #[test]
    fn test_inactive_user_gated_like_pending() {
        let err = check_page_access(&user(ProfileStatus::Inactive, "Administrador"), Page::Users)
            .unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_INACTIVE");
    }

    #[test]
    fn test_user_management_requires_admin() {
        let err = check_page_access(&user(ProfileStatus::Active, "Almoxarife"), Page::Users)
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_PERMISSIONS");
        assert!(check_page_access(&user(ProfileStatus::Active, "Administrador"), Page::Users).is_ok());
    }

    #[test]
    fn test_missing_profile_is_pending() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            email: "novo@escola.gov.br".to_string(),
            profile: None,
        };
        assert_eq!(user.status(), ProfileStatus::Pending);
        assert_eq!(
            check_page_access(&user, Page::Inventory).unwrap_err().code(),
            "ACCOUNT_PENDING"
        );
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
