use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::registro_controller::RegistroController;
use crate::dto::registro_dto::{DashboardResponse, RegistroQuery, RegistrosListResponse};
use crate::dto::response_dto::ApiResponse;
use crate::middleware::auth::EmpresaActual;
use crate::services::export_service::ArchivoExportado;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_registro_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_registros))
        .route("/csv", get(export_csv))
}

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

async fn list_registros(
    State(state): State<AppState>,
    Query(query): Query<RegistroQuery>,
) -> Result<Json<ApiResponse<RegistrosListResponse>>, AppError> {
    let controller = RegistroController::new(state);
    Ok(Json(ApiResponse::success(controller.listar(query).await?)))
}

async fn export_csv(State(state): State<AppState>) -> Result<ArchivoExportado, AppError> {
    let controller = RegistroController::new(state);
    controller.exportar_csv().await
}

async fn get_dashboard(
    State(state): State<AppState>,
    Extension(EmpresaActual(empresa)): Extension<EmpresaActual>,
) -> Result<Json<ApiResponse<DashboardResponse>>, AppError> {
    let controller = RegistroController::new(state);
    Ok(Json(ApiResponse::success(controller.dashboard(empresa).await?)))
}
