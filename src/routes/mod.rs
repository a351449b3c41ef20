//! Router de la aplicación
//!
//! `/api/auth/*` y `/test` son públicas; el resto pasa por el guard de sesión.

pub mod auth_routes;
pub mod editor_routes;
pub mod geocerca_routes;
pub mod lugar_routes;
pub mod mapa_routes;
pub mod registro_routes;
pub mod vendedor_routes;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_middleware, cors_middleware};
use crate::state::AppState;

pub fn create_app_router(state: AppState) -> Router {
    let protegidas = Router::new()
        .nest("/api/dashboard", registro_routes::create_dashboard_router())
        .nest("/api/geocercas", geocerca_routes::create_geocerca_router())
        .nest("/api/editor", editor_routes::create_editor_router())
        .nest("/api/mapa", mapa_routes::create_mapa_router())
        .nest("/api/vendedores", vendedor_routes::create_vendedor_router())
        .nest("/api/registros", registro_routes::create_registro_router())
        .nest("/api/lugares", lugar_routes::create_lugar_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/auth", auth_routes::create_auth_router())
        .merge(protegidas)
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware(&state.config))
        .with_state(state)
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "¡API de Geocercas funcionando correctamente!",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
