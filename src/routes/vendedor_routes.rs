use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::vendedor_controller::VendedorController;
use crate::dto::response_dto::ApiResponse;
use crate::dto::vendedor_dto::{
    ActualizacionUbicacion, CargarVendedoresRequest, UbicacionRequest, VendedorQuery,
    VendedoresListResponse,
};
use crate::services::filtro_service::EstadisticasVendedores;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vendedor_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendedores))
        .route("/cargar", post(load_vendedores))
        .route("/estadisticas", get(get_stats))
        .route("/:id/ubicacion", post(update_location))
        .route("/:id/seleccionar", post(select_vendedor))
}

async fn list_vendedores(
    State(state): State<AppState>,
    Query(query): Query<VendedorQuery>,
) -> Result<Json<ApiResponse<VendedoresListResponse>>, AppError> {
    let controller = VendedorController::new(state);
    Ok(Json(ApiResponse::success(controller.listar(query).await?)))
}

async fn load_vendedores(
    State(state): State<AppState>,
    request: Option<Json<CargarVendedoresRequest>>,
) -> Result<Json<ApiResponse<VendedoresListResponse>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = VendedorController::new(state);
    Ok(Json(controller.cargar(request).await?))
}

async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<EstadisticasVendedores>> {
    let controller = VendedorController::new(state);
    Json(ApiResponse::success(controller.estadisticas().await))
}

async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(ubicacion): Json<UbicacionRequest>,
) -> Result<Json<ApiResponse<ActualizacionUbicacion>>, AppError> {
    let controller = VendedorController::new(state);
    Ok(Json(controller.actualizar_ubicacion(&id, ubicacion).await?))
}

async fn select_vendedor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VendedorController::new(state);
    Ok(Json(controller.seleccionar(&id).await?))
}
