//! User management service: approving, deactivating and re-titling accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{is_admin_role, validate_role, Profile, ProfileStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ProfileRow;

/// Profile service for administrators
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Profile with the account email, for the user management listing
#[derive(Debug, Clone, Serialize)]
pub struct ProfileListItem {
    #[serde(flatten)]
    pub profile: Profile,
    pub email: String,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct ProfileListRow {
    id: Uuid,
    name: Option<String>,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: String,
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProfileListRow> for ProfileListItem {
    type Error = AppError;

    fn try_from(row: ProfileListRow) -> Result<Self, Self::Error> {
        Ok(ProfileListItem {
            profile: Profile::try_from(ProfileRow {
                id: row.id,
                name: row.name,
                role: row.role,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })?,
            email: row.email,
            last_sign_in_at: row.last_sign_in_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub status: Option<ProfileStatus>,
}

/// Role and/or status change made by an administrator
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub role: Option<String>,
    pub status: Option<ProfileStatus>,
}

/// An administrator must keep an active admin role on their own account
fn check_self_update(
    acting_id: Uuid,
    target_id: Uuid,
    role: &str,
    status: ProfileStatus,
) -> AppResult<()> {
    if acting_id == target_id && (status != ProfileStatus::Active || !is_admin_role(role)) {
        return Err(AppError::validation(
            "profile",
            "Administrators cannot demote or deactivate themselves",
        ));
    }
    Ok(())
}

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Profiles, pending ones first, then by name
    pub async fn list(&self, query: ProfileQuery) -> AppResult<Vec<ProfileListItem>> {
        let rows = sqlx::query_as::<_, ProfileListRow>(
            r#"
            SELECT p.id, p.name, p.role, p.status, p.created_at, p.updated_at,
                   u.email, u.last_sign_in_at
            FROM profiles p
            JOIN auth_users u ON u.id = p.id
            WHERE ($1::text IS NULL OR p.status = $1)
            ORDER BY (p.status = 'pending') DESC, p.name NULLS LAST, u.email
            "#,
        )
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProfileListItem::try_from).collect()
    }

    /// Update a profile's role and/or status
    pub async fn update(
        &self,
        acting_id: Uuid,
        profile_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<Profile> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, role, status, created_at, updated_at
            FROM profiles WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;
        let current = Profile::try_from(current)?;

        let role = match input.role {
            Some(role) => {
                validate_role(&role).map_err(|m| AppError::validation("role", m))?;
                role.trim().to_string()
            }
            None => current.role.clone(),
        };
        let status = input.status.unwrap_or(current.status);

        check_self_update(acting_id, profile_id, &role, status)?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles SET role = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, role, status, created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(&role)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if status != current.status {
            tracing::info!(
                %profile_id,
                changed_by = %acting_id,
                from = current.status.as_str(),
                to = status.as_str(),
                "Profile status changed"
            );
        }

        Profile::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_cannot_deactivate_self() {
        let me = Uuid::new_v4();
        let err = check_self_update(me, me, "Administrador", ProfileStatus::Inactive).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(check_self_update(me, me, "Almoxarife", ProfileStatus::Active).is_err());
        assert!(check_self_update(me, me, "admin", ProfileStatus::Active).is_ok());
    }

    #[test]
    fn test_admin_may_change_others() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(check_self_update(me, other, "Servidor", ProfileStatus::Inactive).is_ok());
    }

    #[test]
    fn test_update_input_fields_are_optional() {
        let input: UpdateProfileInput = serde_json::from_str(r#"{"status":"active"}"#).unwrap();
        assert_eq!(input.status, Some(ProfileStatus::Active));
        assert!(input.role.is_none());
    }
}
