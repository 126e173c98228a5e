//! Error handling for the School Inventory platform
//!
//! Provides consistent error responses in English and Portuguese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{Page, ParseEnumError, StockError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        message_pt: String,
    },

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Account not yet approved tried to reach a restricted page
    #[error("Account pending approval")]
    AccountPending { redirect_to: Page },

    #[error("Account inactive")]
    AccountInactive { redirect_to: Page },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_pt: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_pt: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // Request lifetime
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure on one input field
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_pt: translate(message),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            AppError::AccountPending { .. } => "ACCOUNT_PENDING",
            AppError::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions
            | AppError::AccountPending { .. }
            | AppError::AccountInactive { .. } => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (message_en, message_pt, field, redirect_to) = match self {
            AppError::InvalidCredentials => (
                "Invalid email or password".to_string(),
                "E-mail ou senha inválidos".to_string(),
                None,
                None,
            ),
            AppError::Unauthorized { message, message_pt } => {
                (message.clone(), message_pt.clone(), None, None)
            }
            AppError::InsufficientPermissions => (
                "You do not have permission to perform this action".to_string(),
                "Você não tem permissão para realizar esta ação".to_string(),
                None,
                None,
            ),
            AppError::AccountPending { redirect_to } => (
                "Your account is awaiting administrator approval".to_string(),
                "Sua conta aguarda aprovação do administrador".to_string(),
                None,
                Some(*redirect_to),
            ),
            AppError::AccountInactive { redirect_to } => (
                "Your account has been deactivated".to_string(),
                "Sua conta foi desativada".to_string(),
                None,
                Some(*redirect_to),
            ),
            AppError::Validation {
                field,
                message,
                message_pt,
            } => (message.clone(), message_pt.clone(), Some(field.clone()), None),
            AppError::Conflict {
                resource,
                message,
                message_pt,
            } => (message.clone(), message_pt.clone(), Some(resource.clone()), None),
            AppError::NotFound(resource) => (
                format!("{} not found", resource),
                format!("{} não encontrado", resource),
                None,
                None,
            ),
            AppError::InsufficientStock(msg) => (
                msg.clone(),
                format!("Estoque insuficiente: {}", msg),
                Some("quantity".to_string()),
                None,
            ),
            AppError::Timeout(_) => (
                "The server took too long to respond".to_string(),
                "A conexão está instável. Tente novamente.".to_string(),
                None,
                None,
            ),
            AppError::DatabaseError(_) => (
                "A database error occurred".to_string(),
                "Ocorreu um erro no banco de dados".to_string(),
                None,
                None,
            ),
            AppError::Internal(_) => (
                "An internal server error occurred".to_string(),
                "Ocorreu um erro interno no servidor".to_string(),
                None,
                None,
            ),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message_en,
            message_pt,
            field,
            redirect_to,
        }
    }
}

/// Portuguese text for the validation messages produced by `shared::validation`
fn translate(message: &str) -> String {
    match message {
        "Invalid email format" => "Formato de e-mail inválido",
        "Password must be at least 6 characters" => "A senha deve ter pelo menos 6 caracteres",
        "Passwords do not match" => "As senhas não coincidem",
        "Role is required" => "O cargo é obrigatório",
        "Role is too long" => "O cargo é muito longo",
        "Name is required" => "O nome é obrigatório",
        "Name is too long" => "O nome é muito longo",
        "Product name is required" => "O nome do produto é obrigatório",
        "Product name is too long" => "O nome do produto é muito longo",
        "Category is required" => "A categoria é obrigatória",
        "Category is too long" => "A categoria é muito longa",
        "Stock quantity cannot be negative" => "O estoque não pode ser negativo",
        "Quantity must be greater than zero" => "A quantidade deve ser maior que zero",
        "Quantity allows at most 2 decimal places" => {
            "A quantidade aceita no máximo 2 casas decimais"
        }
        "Quantity is too large" => "A quantidade é grande demais",
        "Inactive products accept no movements" => "Produtos inativos não aceitam movimentações",
        "Administrators cannot demote or deactivate themselves" => {
            "Administradores não podem rebaixar ou desativar a própria conta"
        }
        other => return format!("Dados inválidos: {}", other),
    }
    .to_string()
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::NonPositiveQuantity => {
                AppError::validation("quantity", "Quantity must be greater than zero")
            }
            StockError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            StockError::QuantityOutOfRange => {
                AppError::validation("quantity", "Quantity is too large")
            }
        }
    }
}

impl From<ParseEnumError> for AppError {
    fn from(err: ParseEnumError) -> Self {
        // Only reachable through rows the migrations should have constrained
        AppError::Internal(format!("Corrupt stored value: {}", err))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_pt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Page a gated client should navigate to instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<Page>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_detail = self.detail();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {:?}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
