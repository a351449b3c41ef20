//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas. Ningún error es fatal:
//! todos terminan en un mensaje visible para el usuario.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Ruta a la que el front-end debe redirigir cuando la sesión no es válida
pub const RUTA_LOGIN: &str = "/auth/login";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationErrors(#[from] validator::ValidationErrors),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Geolocation unavailable: {0}")]
    GeolocationUnavailable(String),

    #[error("Map not ready: {0}")]
    MapNotReady(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
            redirect: None,
        }
    }
}

impl AppError {
    /// Mensaje que se muestra al usuario (notificación o mensaje en línea)
    pub fn mensaje_usuario(&self) -> String {
        match self {
            AppError::ValidationErrors(_) => "Los datos ingresados no son válidos".to_string(),
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Network(msg)
            | AppError::ExternalApi(msg)
            | AppError::GeolocationUnavailable(msg)
            | AppError::MapNotReady(msg) => msg.clone(),
            AppError::Storage(_) => "❌ Error al guardar datos".to_string(),
            AppError::Internal(_) => "Ha ocurrido un error".to_string(),
        }
    }

    /// Los errores de autenticación obligan a cerrar la sesión
    pub fn es_autenticacion(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mensaje = self.mensaje_usuario();
        let (status, error_response) = match self {
            AppError::ValidationErrors(e) => {
                tracing::warn!("Validation error: {}", e);
                let mut resp = ErrorResponse::new("Validation Error", mensaje, "VALIDATION_ERROR");
                resp.details = Some(json!(e));
                (StatusCode::BAD_REQUEST, resp)
            }

            AppError::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Validation Error", mensaje, "VALIDATION_ERROR"),
                )
            }

            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                let mut resp = ErrorResponse::new("Unauthorized", mensaje, "UNAUTHORIZED");
                resp.redirect = Some(RUTA_LOGIN.to_string());
                (StatusCode::UNAUTHORIZED, resp)
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden access: {}", msg);
                let mut resp = ErrorResponse::new("Forbidden", mensaje, "FORBIDDEN");
                resp.redirect = Some(RUTA_LOGIN.to_string());
                (StatusCode::FORBIDDEN, resp)
            }

            AppError::NotFound(msg) => {
                tracing::warn!("Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not Found", mensaje, "NOT_FOUND"),
                )
            }

            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Conflict", mensaje, "CONFLICT"),
                )
            }

            AppError::Network(msg) => {
                tracing::error!("Network error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Network Error", mensaje, "NETWORK_ERROR"),
                )
            }

            AppError::ExternalApi(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("External API Error", mensaje, "EXTERNAL_API_ERROR"),
                )
            }

            AppError::GeolocationUnavailable(msg) => {
                tracing::warn!("Geolocation unavailable: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("Geolocation Unavailable", mensaje, "GEOLOCATION_UNAVAILABLE"),
                )
            }

            AppError::MapNotReady(msg) => {
                tracing::warn!("Map not ready: {}", msg);
                let mut resp = ErrorResponse::new("Map Not Ready", mensaje, "MAP_NOT_READY");
                resp.details = Some(json!({ "retry": "/api/mapa/{vista}/reintentar" }));
                (StatusCode::SERVICE_UNAVAILABLE, resp)
            }

            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                let mut resp = ErrorResponse::new("Storage Error", mensaje, "STORAGE_ERROR");
                resp.details = Some(json!({ "storage_error": msg }));
                (StatusCode::INTERNAL_SERVER_ERROR, resp)
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                let mut resp = ErrorResponse::new("Internal Server Error", mensaje, "INTERNAL_ERROR");
                resp.details = Some(json!({ "internal_error": msg }));
                (StatusCode::INTERNAL_SERVER_ERROR, resp)
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} con id '{}' no encontrado", resource, id))
}

/// Función helper para crear errores de validación con mensaje
pub fn validation_error(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Función helper para crear errores de almacenamiento
pub fn storage_error(operation: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Storage(format!("{}: {}", operation, err))
}
