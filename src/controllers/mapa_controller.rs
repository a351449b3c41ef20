use crate::dto::lugar_dto::IrALugarRequest;
use crate::dto::mapa_dto::{AccionRequest, CentrarRequest, ContenedorRequest, MapaSnapshot};
use crate::dto::response_dto::ApiResponse;
use crate::models::geocerca::Punto;
use crate::models::mapa::VistaMapaId;
use crate::services::mapa_service::{self, MARGEN_AJUSTE};
use crate::state::{AppState, MARGEN_REGISTROS};
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::validate_coordinates;

pub struct MapaController {
    state: AppState,
}

impl MapaController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn snapshot(&self, vista: VistaMapaId) -> MapaSnapshot {
        let mapa = self.state.mapas.get(vista);
        let mapa = mapa.lock().await;
        MapaSnapshot::from(&*mapa)
    }

    /// Inicializa con reintentos acotados y, si queda listo, dibuja.
    /// Agotados los intentos el mapa queda en error hasta `reintentar`.
    async fn inicializar(&self, vista: VistaMapaId) -> Result<MapaSnapshot, AppError> {
        let mapa = self.state.mapas.get(vista);
        mapa_service::inicializar(&mapa, &self.state.config.politica_mapa()).await?;
        self.state.redibujar(vista).await?;
        Ok(self.snapshot(vista).await)
    }

    pub async fn reportar_contenedor(
        &self,
        vista: VistaMapaId,
        contenedor: ContenedorRequest,
    ) -> Result<ApiResponse<MapaSnapshot>, AppError> {
        {
            let mapa = self.state.mapas.get(vista);
            mapa.lock().await.reportar_contenedor(contenedor.ancho, contenedor.alto);
        }
        let snapshot = self.inicializar(vista).await?;
        Ok(ApiResponse::success(snapshot))
    }

    pub async fn reintentar(&self, vista: VistaMapaId) -> Result<ApiResponse<MapaSnapshot>, AppError> {
        tracing::info!("🔄 Reintentando inicializar el mapa de {}", vista);
        let snapshot = self.inicializar(vista).await?;
        Ok(ApiResponse::success_with_message(snapshot, "Mapa inicializado"))
    }

    /// Encuadra los marcadores dibujados
    pub async fn ajustar(&self, vista: VistaMapaId) -> Result<ApiResponse<MapaSnapshot>, AppError> {
        let margen = match vista {
            VistaMapaId::Registros => MARGEN_REGISTROS,
            _ => MARGEN_AJUSTE,
        };
        let ajustado = {
            let mapa = self.state.mapas.get(vista);
            let mut mapa = mapa.lock().await;
            mapa.ajustar_vista(margen)?
        };
        let snapshot = self.snapshot(vista).await;
        if ajustado {
            Ok(ApiResponse::success(snapshot))
        } else {
            Ok(ApiResponse::success_with_message(snapshot, "No hay elementos para mostrar"))
        }
    }

    /// Centra en una entidad (abre su popup) o vuelve al centro por defecto
    pub async fn centrar(
        &self,
        vista: VistaMapaId,
        request: CentrarRequest,
    ) -> Result<ApiResponse<MapaSnapshot>, AppError> {
        {
            let mapa = self.state.mapas.get(vista);
            let mut mapa = mapa.lock().await;
            match request.id.as_deref() {
                Some(id) => mapa.centrar_en(id)?,
                None => mapa.centrar_mapa()?,
            }
        }
        Ok(ApiResponse::success(self.snapshot(vista).await))
    }

    /// Muestra un resultado de búsqueda de lugares
    pub async fn ir_a_lugar(
        &self,
        vista: VistaMapaId,
        lugar: IrALugarRequest,
    ) -> Result<ApiResponse<MapaSnapshot>, AppError> {
        validate_coordinates(lugar.lat, lugar.lng)
            .map_err(|_| validation_error("Coordenadas fuera de rango"))?;
        {
            let mapa = self.state.mapas.get(vista);
            let mut mapa = mapa.lock().await;
            mapa.mostrar_lugar(Punto::new(lugar.lat, lugar.lng), &lugar.nombre, &lugar.direccion)?;
        }
        tracing::info!("📍 Navegando a {}", lugar.nombre);
        Ok(ApiResponse::success(self.snapshot(vista).await))
    }

    /// Botón de un popup, despachado al manejador de la vista montada
    pub async fn accion(&self, request: AccionRequest) -> Result<ApiResponse<MapaSnapshot>, AppError> {
        self.state.eventos.despachar(request.vista, request.accion).await?;
        Ok(ApiResponse::success(self.snapshot(request.vista).await))
    }
}
