//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Mensaje único para cualquier rechazo por rol
pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: &'static str,
}

impl AppError {
    /// Código HTTP asociado a cada variante
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Hash(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Código estable que el cliente puede usar para distinguir errores
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Hash(_) => "HASH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let error_response = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                ErrorResponse {
                    error: "Database Error",
                    message: "An error occurred while accessing the database".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error",
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code,
                }
            }

            AppError::BadRequest(msg) => {
                warn!("⚠️ Bad request: {}", msg);
                ErrorResponse {
                    error: "Bad Request",
                    message: msg,
                    details: None,
                    code,
                }
            }

            AppError::Unauthenticated(msg) => {
                warn!("🔒 Unauthenticated request: {}", msg);
                ErrorResponse {
                    error: "Unauthenticated",
                    message: msg,
                    details: None,
                    code,
                }
            }

            AppError::Unauthorized(msg) => {
                warn!("🚫 Unauthorized request: {}", msg);
                ErrorResponse {
                    error: "Unauthorized",
                    message: msg,
                    details: None,
                    code,
                }
            }

            AppError::NotFound(msg) => ErrorResponse {
                error: "Not Found",
                message: msg,
                details: None,
                code,
            },

            AppError::InvalidState(msg) => {
                warn!("⚠️ Invalid state: {}", msg);
                ErrorResponse {
                    error: "Invalid State",
                    message: msg,
                    details: None,
                    code,
                }
            }

            AppError::Hash(msg) => {
                error!("❌ Hash error: {}", msg);
                ErrorResponse {
                    error: "Hash Error",
                    message: "An error occurred while processing credentials".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error",
                    message: "An unexpected error occurred".to_string(),
                    details: None,
                    code,
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación de un campo
pub fn validation_error(field: &'static str, message: impl Into<Cow<'static, str>>) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("invalid");
    error.message = Some(message.into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de estado inválido
pub fn invalid_state_error(message: impl Into<String>) -> AppError {
    AppError::InvalidState(message.into())
}

/// Función helper para el rechazo por permisos
pub fn unauthorized_error() -> AppError {
    AppError::Unauthorized(INSUFFICIENT_PERMISSIONS.to_string())
}

/// Traducir errores de PostgreSQL conocidos a errores de dominio
///
/// Las violaciones de unicidad se devuelven como error de validación del campo
/// afectado; las de los índices parciales del historial de asignaciones como
/// estado inválido.
pub fn map_db_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or_default();
                if constraint.starts_with("uq_active_assignment") {
                    return invalid_state_error(
                        "A conflicting active assignment already exists",
                    );
                }
                return validation_error(unique_field(constraint), "already exists");
            }
            Some("23503") => {
                return AppError::NotFound("Referenced resource not found".to_string());
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

fn unique_field(constraint: &str) -> &'static str {
    match constraint {
        "users_username_key" => "username",
        "users_email_key" => "email",
        "drivers_license_number_key" => "licenseNumber",
        "vehicles_registration_number_key" => "registrationNumber",
        "system_settings_pkey" => "key",
        _ => "value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            validation_error("make", "required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthenticated("no session".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(unauthorized_error().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(not_found_error("Vehicle", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            invalid_state_error("retired").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_state_has_its_own_code() {
        assert_eq!(invalid_state_error("x").code(), "INVALID_STATE");
        assert_eq!(validation_error("x", "y").code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_validation_error_carries_field() {
        match validation_error("licenseNumber", "already exists") {
            AppError::Validation(errors) => {
                let fields = errors.field_errors();
                let field = fields.get("licenseNumber").expect("field error");
                assert_eq!(field[0].message.as_deref(), Some("already exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unique_field_mapping() {
        assert_eq!(unique_field("users_username_key"), "username");
        assert_eq!(unique_field("drivers_license_number_key"), "licenseNumber");
        assert_eq!(unique_field("unknown"), "value");
    }
}
