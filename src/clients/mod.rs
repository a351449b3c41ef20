//! Clients - HTTP Clients for External APIs
//!
//! This module contains HTTP clients for communicating with external APIs.

pub mod api_client;

// Re-export main types for convenience
pub use api_client::{error_por_status, ApiClient, MSG_SIN_CONEXION, RUTA_LOGIN_REMOTO};
