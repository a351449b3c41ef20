use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::mapa_controller::MapaController;
use crate::dto::lugar_dto::IrALugarRequest;
use crate::dto::mapa_dto::{AccionRequest, CentrarRequest, ContenedorRequest, MapaSnapshot};
use crate::dto::response_dto::ApiResponse;
use crate::models::mapa::VistaMapaId;
use crate::state::AppState;
use crate::utils::errors::AppError;

type MapaResult = Result<Json<ApiResponse<MapaSnapshot>>, AppError>;

/// Un mapa por vista: `geocercas`, `vendedores` o `registros`
pub fn create_mapa_router() -> Router<AppState> {
    Router::new()
        .route("/acciones", post(popup_action))
        .route("/:vista", get(get_map))
        .route("/:vista/contenedor", post(report_container))
        .route("/:vista/reintentar", post(retry_init))
        .route("/:vista/ajustar", post(fit_view))
        .route("/:vista/centrar", post(center))
        .route("/:vista/lugar", post(go_to_place))
}

async fn get_map(State(state): State<AppState>, Path(vista): Path<VistaMapaId>) -> Json<ApiResponse<MapaSnapshot>> {
    let controller = MapaController::new(state);
    Json(ApiResponse::success(controller.snapshot(vista).await))
}

async fn report_container(
    State(state): State<AppState>,
    Path(vista): Path<VistaMapaId>,
    Json(contenedor): Json<ContenedorRequest>,
) -> MapaResult {
    Ok(Json(MapaController::new(state).reportar_contenedor(vista, contenedor).await?))
}

async fn retry_init(State(state): State<AppState>, Path(vista): Path<VistaMapaId>) -> MapaResult {
    Ok(Json(MapaController::new(state).reintentar(vista).await?))
}

async fn fit_view(State(state): State<AppState>, Path(vista): Path<VistaMapaId>) -> MapaResult {
    Ok(Json(MapaController::new(state).ajustar(vista).await?))
}

async fn center(
    State(state): State<AppState>,
    Path(vista): Path<VistaMapaId>,
    request: Option<Json<CentrarRequest>>,
) -> MapaResult {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(MapaController::new(state).centrar(vista, request).await?))
}

async fn go_to_place(
    State(state): State<AppState>,
    Path(vista): Path<VistaMapaId>,
    Json(lugar): Json<IrALugarRequest>,
) -> MapaResult {
    Ok(Json(MapaController::new(state).ir_a_lugar(vista, lugar).await?))
}

async fn popup_action(State(state): State<AppState>, Json(request): Json<AccionRequest>) -> MapaResult {
    Ok(Json(MapaController::new(state).accion(request).await?))
}
