use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::lugar_controller::LugarController;
use crate::dto::lugar_dto::{BuscarLugarQuery, ResultadoBusqueda};
use crate::dto::response_dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_lugar_router() -> Router<AppState> {
    Router::new().route("/buscar", get(search_places))
}

async fn search_places(
    State(state): State<AppState>,
    Query(query): Query<BuscarLugarQuery>,
) -> Result<Json<ApiResponse<ResultadoBusqueda>>, AppError> {
    let controller = LugarController::new(state);
    Ok(Json(ApiResponse::success(controller.buscar(&query.q).await?)))
}
