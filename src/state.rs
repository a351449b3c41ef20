//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: sesión, repositorios, editor, un renderizador
//! por vista de mapa y los filtros activos de cada listado.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::clients::ApiClient;
use crate::config::EnvironmentConfig;
use crate::models::geocerca::Geocerca;
use crate::models::mapa::VistaMapaId;
use crate::models::registro::Registro;
use crate::repositories::{self, RepositorioGeocercas, RepositorioRegistros};
use crate::services::filtro_service::{FiltrosGeocerca, FiltrosRegistro};
use crate::services::mapa_service::{GeocercaEnMapa, MapaError, RenderizadorMapa};
use crate::services::{
    AuthService, EditorGeocercas, GeocodingService, Mapas, MontajeVendedores, RegistroEventos,
};
use crate::utils::debounce::Debouncer;
use crate::utils::errors::AppResult;

/// Margen al encuadrar el mapa de registros
pub const MARGEN_REGISTROS: f64 = 0.12;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub auth: Arc<AuthService>,
    pub geocercas: Arc<dyn RepositorioGeocercas>,
    pub registros: Arc<RepositorioRegistros>,
    pub editor: Arc<Mutex<EditorGeocercas>>,
    pub mapas: Mapas,
    pub eventos: RegistroEventos,
    pub vendedores: Arc<MontajeVendedores>,
    pub geocoding: Arc<GeocodingService>,
    pub debouncer: Arc<Debouncer>,
    pub filtros_geocercas: Arc<RwLock<FiltrosGeocerca>>,
    /// `None` hasta la primera consulta: se usa el rango por defecto
    pub filtros_registros: Arc<RwLock<Option<FiltrosRegistro>>>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> anyhow::Result<Self> {
        let almacen = repositories::almacen_local(&config);
        let api = ApiClient::new(&config.api_url)?;
        let auth = Arc::new(AuthService::new(api, almacen.clone()));
        let geocercas = repositories::repositorio_geocercas(&config, almacen.clone(), auth.clone());
        let registros = Arc::new(RepositorioRegistros::new(almacen));
        let geocoding = Arc::new(GeocodingService::new(&config)?);
        let debouncer = Arc::new(Debouncer::new(config.debounce_busqueda()));

        let mapas = Mapas::en_memoria();
        let eventos = RegistroEventos::new();
        let vendedores = Arc::new(MontajeVendedores::new());
        vendedores.montar(&eventos, mapas.get(VistaMapaId::Vendedores));

        Ok(Self {
            config,
            auth,
            geocercas,
            registros,
            editor: Arc::new(Mutex::new(EditorGeocercas::new())),
            mapas,
            eventos,
            vendedores,
            geocoding,
            debouncer,
            filtros_geocercas: Arc::new(RwLock::new(FiltrosGeocerca::default())),
            filtros_registros: Arc::new(RwLock::new(None)),
        })
    }

    /// Vista de vendedores nueva al cambiar de sesión o de empresa: los datos,
    /// la paginación y la selección anteriores se descartan, y una carga que
    /// siga en vuelo ya no encuentra la vista vieja.
    pub async fn remontar_vendedores(&self) -> AppResult<()> {
        self.vendedores.montar(&self.eventos, self.mapas.get(VistaMapaId::Vendedores));
        self.redibujar(VistaMapaId::Vendedores).await?;
        Ok(())
    }

    /// Geocercas que pasan los filtros activos
    pub async fn geocercas_filtradas(&self) -> AppResult<(Vec<Geocerca>, Vec<Geocerca>)> {
        let todas = self.geocercas.listar().await?;
        let filtradas = self.filtros_geocercas.read().await.aplicar(&todas);
        Ok((todas, filtradas))
    }

    /// Registros que pasan los filtros activos (o los de por defecto)
    pub async fn registros_filtrados(&self) -> AppResult<(Vec<Registro>, FiltrosRegistro, Vec<Registro>)> {
        let todos = self.registros.listar().await?;
        let filtros = self
            .filtros_registros
            .read()
            .await
            .clone()
            .unwrap_or_else(|| FiltrosRegistro::por_defecto(&todos));
        let filtrados = filtros.aplicar(&todos);
        Ok((todos, filtros, filtrados))
    }

    /// Limpia y vuelve a dibujar las entidades de una vista. Si el mapa aún
    /// no está listo el dibujo se pospone y devuelve 0.
    pub async fn redibujar(&self, vista: VistaMapaId) -> AppResult<usize> {
        let mapa = self.mapas.get(vista);
        let resultado = match vista {
            VistaMapaId::Geocercas => {
                // la lectura del repositorio puede ir a la red: sin locks tomados
                let (_, filtradas) = self.geocercas_filtradas().await?;
                let editor = self.editor.lock().await;
                let edicion = editor.vertices_en_edicion();
                let dibujables: Vec<GeocercaEnMapa<'_>> = filtradas
                    .iter()
                    .map(|geocerca| GeocercaEnMapa {
                        geocerca,
                        vertices_en_edicion: edicion
                            .filter(|(id, _)| *id == geocerca.id)
                            .map(|(_, puntos)| puntos),
                    })
                    .collect();

                let mut mapa = mapa.lock().await;
                mapa.renderizar(&dibujables).and_then(|total| {
                    mapa.renderizar_temporal(editor.vista_previa())?;
                    Ok(total)
                })
            }
            VistaMapaId::Vendedores => {
                let vista_vendedores = self.vendedores.vista();
                let vista_vendedores = vista_vendedores.read().await;
                let mut mapa = mapa.lock().await;
                vista_vendedores.dibujar(&mut mapa)
            }
            VistaMapaId::Registros => {
                let (_, _, filtrados) = self.registros_filtrados().await?;
                let mut mapa = mapa.lock().await;
                mapa.renderizar(&filtrados).and_then(|total| {
                    mapa.ajustar_vista(MARGEN_REGISTROS)?;
                    Ok(total)
                })
            }
        };

        match resultado {
            Ok(total) => {
                tracing::debug!("🗺️ Mapa de {} redibujado con {} entidades", vista, total);
                Ok(total)
            }
            Err(MapaError::NoListo) => {
                tracing::debug!("⏳ Mapa de {} no listo, dibujo pospuesto", vista);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}
