use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{EstadoSesion, LoginResultado, SeleccionarEmpresaRequest};
use crate::dto::response_dto::ApiResponse;
use crate::models::auth::{LoginRequest, SesionInfo};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de sesión; no pasan por el guard
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/empresa", post(seleccionar_empresa))
        .route("/logout", post(logout))
        .route("/sesion", get(sesion))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResultado>>, AppError> {
    let controller = AuthController::new(state);
    Ok(Json(controller.login(request).await?))
}

async fn seleccionar_empresa(
    State(state): State<AppState>,
    Json(request): Json<SeleccionarEmpresaRequest>,
) -> Result<Json<ApiResponse<SesionInfo>>, AppError> {
    let controller = AuthController::new(state);
    Ok(Json(controller.seleccionar_empresa(request.id).await?))
}

async fn logout(State(state): State<AppState>) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AuthController::new(state);
    Ok(Json(controller.logout().await?))
}

async fn sesion(State(state): State<AppState>) -> Result<Json<ApiResponse<EstadoSesion>>, AppError> {
    let controller = AuthController::new(state);
    Ok(Json(controller.sesion().await?))
}
