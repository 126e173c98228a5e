//! Authentication service for sign-up, sign-in, sessions and token management

use std::time::Duration as StdDuration;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{
    validate_email, validate_password, validate_password_confirmation, validate_person_name,
    AuthState, Profile, ProfileStatus, DEFAULT_ROLE,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ProfileRow;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for creating a new account
#[derive(Debug, Deserialize)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Response after successful sign-up; no tokens until the user signs in
#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user_id: Uuid,
    pub profile: Profile,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Tokens plus the profile of the user who signed in
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// Restored session as seen by a client
#[derive(Debug, Serialize)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub profile: Option<Profile>,
    pub state: AuthState,
}

impl Session {
    fn signed_out() -> Self {
        Session {
            user: None,
            profile: None,
            state: AuthState::Unauthenticated,
        }
    }
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Create an auth user and its pending profile
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<SignUpResponse> {
        let email = normalize_email(&input.email);
        validate_email(&email).map_err(|m| AppError::validation("email", m))?;
        validate_password(&input.password).map_err(|m| AppError::validation("password", m))?;
        validate_person_name(&input.name).map_err(|m| AppError::validation("name", m))?;

        // Hash password
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        // Start transaction
        let mut tx = self.db.begin().await?;

        // No row comes back when the email exists, even if inserted concurrently
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO auth_users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(email_taken)?;

        // Every new account waits for an administrator
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, name, role, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, role, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(input.name.trim())
        .bind(DEFAULT_ROLE)
        .bind(ProfileStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // Commit transaction
        tx.commit().await?;

        tracing::info!(%user_id, "New account created, awaiting approval");

        Ok(SignUpResponse {
            user_id,
            profile: Profile::try_from(row)?,
        })
    }

    /// Authenticate user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SignInResponse> {
        // Find user by email
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM auth_users WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        // Verify password
        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        // Update last sign-in
        sqlx::query("UPDATE auth_users SET last_sign_in_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        // Pending and inactive accounts still sign in; the page gate limits them
        let profile = self.load_profile(user.id).await?;

        // Generate tokens
        let tokens = self.generate_tokens(user.id, &user.email)?;

        // Store refresh token
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        Ok(SignInResponse { tokens, profile })
    }

    /// Rotate a refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        // Hash the refresh token to look up
        let token_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        // Revoke and fetch in one step so a token can only be used once
        let (user_id, email) = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM auth_users u
            WHERE u.id = rt.user_id
              AND rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
            RETURNING rt.user_id, u.email
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid or expired refresh token".to_string(),
            message_pt: "Token de atualização inválido ou expirado".to_string(),
        })?;

        // Generate new tokens
        let tokens = self.generate_tokens(user_id, &email)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(hash_token(&tokens.refresh_token))
        .bind(Utc::now() + Duration::seconds(self.refresh_token_expiry))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(tokens)
    }

    /// Revoke every refresh token of a user
    pub async fn sign_out(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Restore the session behind a bearer token.
    ///
    /// Never fails: a missing or bad token, or a lookup that outlives
    /// `limit`, yields an unauthenticated session rather than an error.
    pub async fn restore_session(&self, token: Option<&str>, limit: StdDuration) -> Session {
        let Some(claims) = token.and_then(|t| self.validate_token(t).ok()) else {
            return Session::signed_out();
        };
        let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
            return Session::signed_out();
        };

        match tokio::time::timeout(limit, self.load_profile(user_id)).await {
            Ok(Ok(profile)) => Session {
                state: AuthState::resolved(profile.as_ref().map(|p| p.status), true),
                user: Some(SessionUser {
                    id: user_id,
                    email: claims.email,
                }),
                profile,
            },
            Ok(Err(e)) => {
                tracing::warn!(%user_id, "Session restore failed: {}", e);
                Session::signed_out()
            }
            Err(_) => {
                tracing::warn!(%user_id, "Session restore timed out");
                Session::signed_out()
            }
        }
    }

    /// Change the signed-in user's password
    pub async fn update_password(
        &self,
        user_id: Uuid,
        password: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        validate_password_confirmation(password, confirmation)
            .map_err(|m| AppError::validation("password", m))?;

        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let updated = sqlx::query("UPDATE auth_users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(&password_hash)
            .execute(&self.db)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!(%user_id, "Password updated");
        Ok(())
    }

    /// Change the signed-in user's display name
    pub async fn update_profile_name(&self, user_id: Uuid, name: &str) -> AppResult<Profile> {
        validate_person_name(name).map_err(|m| AppError::validation("name", m))?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, role, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        Profile::try_from(row)
    }

    /// Profile of a user, `None` when the row does not exist
    pub async fn load_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, name, role, status, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized {
            message: format!("Invalid token: {}", e),
            message_pt: "Token inválido".to_string(),
        })?;

        Ok(token_data.claims)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, email: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        // Access token claims
        let access_claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token (random, stored hashed)
        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

/// Conflict returned when an email already has an account
fn email_taken() -> AppError {
    AppError::Conflict {
        resource: "email".to_string(),
        message: "An account with this email already exists".to_string(),
        message_pt: "Já existe uma conta com este e-mail".to_string(),
    }
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> AuthService {
        let config = Config::for_tests();
        // Lazy pool: never connects unless a query runs
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");
        AuthService::new(db, &config)
    }

    #[test]
    fn test_hash_token_is_stable_sha256() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        assert_eq!(hash_token("abc").len(), 64);
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let err = email_taken();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Souza@Escola.GOV.br "), "ana.souza@escola.gov.br");
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();
        let tokens = service.generate_tokens(user_id, "ana@escola.gov.br").unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_ne!(tokens.access_token, tokens.refresh_token);

        let claims = service.validate_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "ana@escola.gov.br");
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let service = service();
        let tokens = service.generate_tokens(Uuid::new_v4(), "ana@escola.gov.br").unwrap();
        let tampered = format!("{}x", tokens.access_token);
        assert_eq!(service.validate_token(&tampered).unwrap_err().code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_restore_session_without_token_is_signed_out() {
        let session = service()
            .restore_session(None, StdDuration::from_secs(5))
            .await;
        assert_eq!(session.state, AuthState::Unauthenticated);
        assert!(session.user.is_none());

        let session = service()
            .restore_session(Some("not-a-jwt"), StdDuration::from_secs(5))
            .await;
        assert_eq!(session.state, AuthState::Unauthenticated);
    }
}
