use chrono::Utc;

use crate::dto::geocerca_dto::{FormularioGeocerca, GeocercaQuery, GeocercasListResponse};
use crate::dto::response_dto::ApiResponse;
use crate::models::geocerca::Geocerca;
use crate::models::mapa::VistaMapaId;
use crate::services::editor_service::generar_id;
use crate::services::export_service::{self, ArchivoExportado};
use crate::services::filtro_service::{EstadisticasGeocercas, FiltrosGeocerca};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct GeocercaController {
    state: AppState,
}

impl GeocercaController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Aplica los filtros de la query, los recuerda para el mapa y redibuja
    pub async fn listar(&self, query: GeocercaQuery) -> Result<GeocercasListResponse, AppError> {
        let filtros = FiltrosGeocerca::desde_query(
            query.q.as_deref(),
            query.tipo.as_deref(),
            query.estado.as_deref(),
            query.forma.as_deref(),
        );
        *self.state.filtros_geocercas.write().await = filtros;

        let (todas, filtradas) = self.state.geocercas_filtradas().await?;
        self.state.redibujar(VistaMapaId::Geocercas).await?;

        let estadisticas = EstadisticasGeocercas::de(&todas);
        Ok(GeocercasListResponse {
            total: estadisticas.total,
            filtradas: filtradas.len(),
            activas: estadisticas.activas,
            inactivas: estadisticas.inactivas,
            geocercas: filtradas,
        })
    }

    pub async fn obtener(&self, id: &str) -> Result<Geocerca, AppError> {
        self.state.geocercas.obtener(id).await
    }

    /// Alta directa desde un formulario completo
    pub async fn crear(&self, formulario: FormularioGeocerca) -> Result<ApiResponse<Geocerca>, AppError> {
        let ahora = Utc::now();
        let geocerca = formulario.a_geocerca(generar_id(ahora), ahora)?;
        let creada = self.state.geocercas.crear(geocerca).await?;
        self.state.redibujar(VistaMapaId::Geocercas).await?;

        tracing::info!("✅ Geocerca '{}' creada ({})", creada.nombre, creada.id);
        Ok(ApiResponse::success_with_message(creada, "Geocerca creada exitosamente"))
    }

    /// Reemplaza la geocerca conservando id y fecha de creación
    pub async fn actualizar(
        &self,
        id: &str,
        formulario: FormularioGeocerca,
    ) -> Result<ApiResponse<Geocerca>, AppError> {
        let original = self.state.geocercas.obtener(id).await?;
        let geocerca = formulario.a_geocerca(original.id, original.fecha_creacion)?;
        let actualizada = self.state.geocercas.actualizar(geocerca).await?;
        self.state.redibujar(VistaMapaId::Geocercas).await?;

        tracing::info!("✏️ Geocerca '{}' actualizada", actualizada.id);
        Ok(ApiResponse::success_with_message(actualizada, "Geocerca actualizada exitosamente"))
    }

    pub async fn eliminar(&self, id: &str) -> Result<ApiResponse<()>, AppError> {
        self.state.geocercas.eliminar(id).await?;

        // si estaba abierta en el editor, el formulario ya no tiene sentido
        {
            let mut editor = self.state.editor.lock().await;
            if editor.en_edicion().is_some_and(|g| g.id == id) {
                editor.cancelar();
            }
        }
        self.state.redibujar(VistaMapaId::Geocercas).await?;

        tracing::info!("🗑️ Geocerca '{}' eliminada", id);
        Ok(ApiResponse::ok("Geocerca eliminada exitosamente"))
    }

    /// Activa o desactiva; solo cambia la opacidad con que se dibuja
    pub async fn alternar_estado(&self, id: &str) -> Result<ApiResponse<Geocerca>, AppError> {
        let mut geocerca = self.state.geocercas.obtener(id).await?;
        geocerca.activa = !geocerca.activa;
        let actualizada = self.state.geocercas.actualizar(geocerca).await?;
        self.state.redibujar(VistaMapaId::Geocercas).await?;

        let mensaje = if actualizada.activa {
            "Geocerca activada"
        } else {
            "Geocerca desactivada"
        };
        Ok(ApiResponse::success_with_message(actualizada, mensaje))
    }

    /// Centra el mapa en la geocerca y abre su popup
    pub async fn centrar(&self, id: &str) -> Result<ApiResponse<()>, AppError> {
        self.state.redibujar(VistaMapaId::Geocercas).await?;
        let mapa = self.state.mapas.get(VistaMapaId::Geocercas);
        mapa.lock().await.centrar_en(id)?;
        Ok(ApiResponse::ok(format!("Centrado en {}", id)))
    }

    pub async fn exportar(&self) -> Result<ArchivoExportado, AppError> {
        let geocercas = self.state.geocercas.listar().await?;
        export_service::geocercas_json(&geocercas, Utc::now().date_naive())
    }
}
