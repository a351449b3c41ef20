use crate::dto::response_dto::ApiResponse;
use crate::dto::vendedor_dto::{
    ActualizacionUbicacion, CargarVendedoresRequest, UbicacionRequest, VendedorQuery,
    VendedoresListResponse,
};
use crate::models::mapa::VistaMapaId;
use crate::services::filtro_service::{EstadisticasVendedores, FiltrosVendedor};
use crate::services::vendedor_service;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct VendedorController {
    state: AppState,
}

impl VendedorController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn respuesta(&self) -> VendedoresListResponse {
        let vista = self.state.vendedores.vista();
        let vista = vista.read().await;
        VendedoresListResponse {
            vendedores: vista.filtrados(),
            paginacion: vista.paginacion.clone(),
            cargando: vista.cargando,
            error: vista.error.clone(),
            estadisticas: vista.estadisticas(),
        }
    }

    /// Filtro local sobre la página cargada
    pub async fn listar(&self, query: VendedorQuery) -> Result<VendedoresListResponse, AppError> {
        {
            let vista = self.state.vendedores.vista();
            vista.write().await.filtros =
                FiltrosVendedor::desde_query(query.q.as_deref(), query.estado.as_deref());
        }
        self.state.redibujar(VistaMapaId::Vendedores).await?;
        Ok(self.respuesta().await)
    }

    /// Pide una página al API remoto. Un fallo deja los datos previos y
    /// el mensaje de error en la vista.
    pub async fn cargar(
        &self,
        request: CargarVendedoresRequest,
    ) -> Result<ApiResponse<VendedoresListResponse>, AppError> {
        let resultado = vendedor_service::cargar(
            self.state.vendedores.debil(),
            &self.state.auth,
            request,
            self.state.config.page_size,
        )
        .await;

        match resultado {
            Ok(total) => {
                self.state.redibujar(VistaMapaId::Vendedores).await?;
                Ok(ApiResponse::success_with_message(
                    self.respuesta().await,
                    format!("{} vendedores cargados", total),
                ))
            }
            // la sesión se cerró: el front-end debe volver al login
            Err(e) if e.es_autenticacion() => Err(e),
            Err(e) => {
                tracing::error!("❌ Error al cargar vendedores: {}", e);
                Ok(ApiResponse {
                    success: false,
                    message: Some(e.mensaje_usuario()),
                    data: Some(self.respuesta().await),
                })
            }
        }
    }

    pub async fn actualizar_ubicacion(
        &self,
        id: &str,
        ubicacion: UbicacionRequest,
    ) -> Result<ApiResponse<ActualizacionUbicacion>, AppError> {
        let vista = self.state.vendedores.vista();
        let mapa = self.state.mapas.get(VistaMapaId::Vendedores);
        let actualizacion =
            vendedor_service::actualizar_ubicacion(&vista, &mapa, id, ubicacion).await?;
        Ok(ApiResponse::success_with_message(
            actualizacion,
            "Ubicación actualizada exitosamente",
        ))
    }

    pub async fn seleccionar(&self, id: &str) -> Result<ApiResponse<()>, AppError> {
        let vista = self.state.vendedores.vista();
        let mapa = self.state.mapas.get(VistaMapaId::Vendedores);
        vendedor_service::seleccionar(&vista, &mapa, id).await?;
        Ok(ApiResponse::ok(format!("Vendedor {} seleccionado", id)))
    }

    pub async fn estadisticas(&self) -> EstadisticasVendedores {
        let vista = self.state.vendedores.vista();
        let estadisticas = vista.read().await.estadisticas();
        estadisticas
    }
}
