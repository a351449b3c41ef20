use crate::dto::lugar_dto::ResultadoBusqueda;
use crate::state::AppState;
use crate::utils::debounce::Debounced;
use crate::utils::errors::AppError;

pub struct LugarController {
    state: AppState,
}

impl LugarController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Búsqueda con debounce: solo la última consulta de una ráfaga llega a Nominatim
    pub async fn buscar(&self, consulta: &str) -> Result<ResultadoBusqueda, AppError> {
        // buscador vacío: la próxima búsqueda del mismo término vuelve a ejecutarse
        if consulta.trim().is_empty() {
            self.state.debouncer.reiniciar();
            return Ok(ResultadoBusqueda::Ejecutada { lugares: Vec::new() });
        }

        let geocoding = self.state.geocoding.clone();
        let resultado = self
            .state
            .debouncer
            .ejecutar_falible(consulta.trim(), || async move { geocoding.buscar_lugares(consulta).await })
            .await;

        match resultado {
            Debounced::Ejecutada(Err(e)) => {
                tracing::error!("❌ Error buscando lugares: {}", e);
                Err(AppError::ExternalApi("Error al buscar lugares".to_string()))
            }
            Debounced::Ejecutada(Ok(lugares)) => {
                Ok(ResultadoBusqueda::Ejecutada { lugares })
            }
            Debounced::Reemplazada => Ok(ResultadoBusqueda::Reemplazada),
            Debounced::SinCambios => Ok(ResultadoBusqueda::SinCambios),
        }
    }
}
