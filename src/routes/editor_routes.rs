use axum::{
    extract::{Path, State},
    routing::{get, patch, post, put},
    Json, Router,
};

use crate::controllers::editor_controller::EditorController;
use crate::dto::editor_dto::{EditorSnapshot, FormaRequest, PuntoRequest, RadioRequest};
use crate::dto::geocerca_dto::CambiosFormulario;
use crate::dto::response_dto::ApiResponse;
use crate::models::geocerca::Geocerca;
use crate::state::AppState;
use crate::utils::errors::AppError;

type EditorResult = Result<Json<ApiResponse<EditorSnapshot>>, AppError>;

pub fn create_editor_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_editor))
        .route("/modo", post(toggle_mode))
        .route("/forma", post(set_shape))
        .route("/radio", post(set_radius))
        .route("/click", post(map_click))
        .route("/vertices/:indice", put(move_vertex).delete(delete_vertex))
        .route("/confirmar", post(confirm))
        .route("/punto-seleccionado", post(create_at_selected_point))
        .route("/editar/:id", post(edit))
        .route("/formulario", patch(update_form))
        .route("/guardar", post(save))
        .route("/cancelar", post(cancel))
}

async fn get_editor(State(state): State<AppState>) -> Json<ApiResponse<EditorSnapshot>> {
    let controller = EditorController::new(state);
    Json(ApiResponse::success(controller.snapshot().await))
}

async fn toggle_mode(State(state): State<AppState>) -> EditorResult {
    Ok(Json(EditorController::new(state).alternar_modo().await?))
}

async fn set_shape(State(state): State<AppState>, Json(request): Json<FormaRequest>) -> EditorResult {
    Ok(Json(EditorController::new(state).cambiar_forma(request.forma).await?))
}

async fn set_radius(State(state): State<AppState>, Json(request): Json<RadioRequest>) -> EditorResult {
    Ok(Json(EditorController::new(state).fijar_radio(request.radio).await?))
}

async fn map_click(State(state): State<AppState>, Json(punto): Json<PuntoRequest>) -> EditorResult {
    Ok(Json(EditorController::new(state).click(punto.into()).await?))
}

async fn move_vertex(
    State(state): State<AppState>,
    Path(indice): Path<usize>,
    Json(punto): Json<PuntoRequest>,
) -> EditorResult {
    Ok(Json(EditorController::new(state).mover_vertice(indice, punto.into()).await?))
}

async fn delete_vertex(State(state): State<AppState>, Path(indice): Path<usize>) -> EditorResult {
    Ok(Json(EditorController::new(state).eliminar_vertice(indice).await?))
}

async fn confirm(State(state): State<AppState>) -> EditorResult {
    Ok(Json(EditorController::new(state).confirmar().await?))
}

async fn create_at_selected_point(State(state): State<AppState>) -> EditorResult {
    Ok(Json(EditorController::new(state).crear_en_punto_seleccionado().await?))
}

async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> EditorResult {
    Ok(Json(EditorController::new(state).editar(&id).await?))
}

async fn update_form(
    State(state): State<AppState>,
    Json(cambios): Json<CambiosFormulario>,
) -> EditorResult {
    Ok(Json(EditorController::new(state).actualizar_formulario(cambios).await?))
}

async fn save(State(state): State<AppState>) -> Result<Json<ApiResponse<Geocerca>>, AppError> {
    Ok(Json(EditorController::new(state).guardar().await?))
}

async fn cancel(State(state): State<AppState>) -> EditorResult {
    Ok(Json(EditorController::new(state).cancelar().await?))
}
