use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::geocerca_controller::GeocercaController;
use crate::dto::geocerca_dto::{FormularioGeocerca, GeocercaQuery, GeocercasListResponse};
use crate::dto::response_dto::ApiResponse;
use crate::models::geocerca::Geocerca;
use crate::services::export_service::ArchivoExportado;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_geocerca_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_geocercas).post(create_geocerca))
        .route("/exportar", get(export_geocercas))
        .route(
            "/:id",
            get(get_geocerca).put(update_geocerca).delete(delete_geocerca),
        )
        .route("/:id/estado", post(toggle_geocerca))
        .route("/:id/centrar", post(center_geocerca))
}

async fn list_geocercas(
    State(state): State<AppState>,
    Query(query): Query<GeocercaQuery>,
) -> Result<Json<ApiResponse<GeocercasListResponse>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(ApiResponse::success(controller.listar(query).await?)))
}

async fn create_geocerca(
    State(state): State<AppState>,
    Json(formulario): Json<FormularioGeocerca>,
) -> Result<Json<ApiResponse<Geocerca>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(controller.crear(formulario).await?))
}

async fn get_geocerca(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Geocerca>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(ApiResponse::success(controller.obtener(&id).await?)))
}

async fn update_geocerca(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(formulario): Json<FormularioGeocerca>,
) -> Result<Json<ApiResponse<Geocerca>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(controller.actualizar(&id, formulario).await?))
}

async fn delete_geocerca(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(controller.eliminar(&id).await?))
}

async fn toggle_geocerca(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Geocerca>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(controller.alternar_estado(&id).await?))
}

async fn center_geocerca(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = GeocercaController::new(state);
    Ok(Json(controller.centrar(&id).await?))
}

async fn export_geocercas(State(state): State<AppState>) -> Result<ArchivoExportado, AppError> {
    let controller = GeocercaController::new(state);
    controller.exportar().await
}
