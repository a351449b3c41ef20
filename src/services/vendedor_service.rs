//! Vista de vendedores
//!
//! La vista se "monta" al entrar en la pantalla de geolocalización y se
//! reemplaza en cada remontaje. Las cargas remotas solo guardan un `Weak` a la
//! vista: si la respuesta llega después de desmontarla, se descarta.

use std::sync::{Arc, Mutex as StdMutex, Weak};

use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};

use crate::dto::vendedor_dto::{
    ActualizacionUbicacion, CargarVendedoresRequest, Coordenadas, UbicacionRequest,
};
use crate::models::geocerca::Punto;
use crate::models::mapa::VistaMapaId;
use crate::models::vendedor::{Paginacion, Vendedor, VendedorRequest};
use crate::services::auth_service::AuthService;
use crate::services::eventos::{AccionMapa, ManejadorAccion, RegistroEventos, Suscripcion};
use crate::services::filtro_service::{EstadisticasVendedores, FiltrosVendedor};
use crate::services::mapa_service::{MapaError, RenderizadorMapa, VendedorEnMapa};
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::validate_coordinates;

/// Zoom al centrar en una ubicación recién actualizada
pub const ZOOM_UBICACION: u8 = 17;
pub const MSG_VENDEDOR_NO_ENCONTRADO: &str = "Vendedor no encontrado";
pub const MSG_SIN_GEOLOCALIZACION: &str = "Geolocalización no disponible en tu dispositivo";

#[derive(Default)]
pub struct VistaVendedores {
    pub vendedores: Vec<Vendedor>,
    pub paginacion: Option<Paginacion>,
    pub cargando: bool,
    pub error: Option<String>,
    pub filtros: FiltrosVendedor,
    pub seleccionado: Option<String>,
    suscripcion: Option<Suscripcion>,
}

impl VistaVendedores {
    pub fn filtrados(&self) -> Vec<Vendedor> {
        self.filtros.aplicar(&self.vendedores)
    }

    pub fn estadisticas(&self) -> EstadisticasVendedores {
        EstadisticasVendedores::de(&self.vendedores)
    }

    /// Limpia los marcadores y dibuja los vendedores filtrados
    pub fn dibujar(&self, mapa: &mut RenderizadorMapa) -> Result<usize, MapaError> {
        let filtrados = self.filtrados();
        let dibujables: Vec<VendedorEnMapa<'_>> = filtrados
            .iter()
            .map(|vendedor| VendedorEnMapa {
                vendedor,
                seleccionado: self.seleccionado.as_deref() == Some(vendedor.id.as_str()),
            })
            .collect();
        mapa.renderizar(&dibujables)
    }

    pub fn suscrita(&self) -> bool {
        self.suscripcion.is_some()
    }
}

/// Vista montada actualmente
pub struct MontajeVendedores {
    actual: StdMutex<Arc<RwLock<VistaVendedores>>>,
}

impl Default for MontajeVendedores {
    fn default() -> Self {
        Self::new()
    }
}

impl MontajeVendedores {
    pub fn new() -> Self {
        Self {
            actual: StdMutex::new(Arc::new(RwLock::new(VistaVendedores::default()))),
        }
    }

    fn actual(&self) -> std::sync::MutexGuard<'_, Arc<RwLock<VistaVendedores>>> {
        match self.actual.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Crea una vista nueva y suelta la anterior junto con su manejador de acciones
    pub fn montar(
        &self,
        eventos: &RegistroEventos,
        mapa: Arc<Mutex<RenderizadorMapa>>,
    ) -> Arc<RwLock<VistaVendedores>> {
        let vista = Arc::new(RwLock::new(VistaVendedores::default()));
        let debil = Arc::downgrade(&vista);

        let manejador: ManejadorAccion = Arc::new(move |accion: AccionMapa| {
            let debil = debil.clone();
            let mapa = mapa.clone();
            async move { atender_accion(debil, mapa, accion).await }.boxed()
        });
        let suscripcion = eventos.suscribir(VistaMapaId::Vendedores, manejador);

        // la vista recién creada no está compartida todavía
        if let Ok(mut v) = vista.try_write() {
            v.suscripcion = Some(suscripcion);
        }

        let anterior = std::mem::replace(&mut *self.actual(), vista.clone());
        drop(anterior);
        tracing::debug!("📌 Vista de vendedores montada");
        vista
    }

    pub fn vista(&self) -> Arc<RwLock<VistaVendedores>> {
        self.actual().clone()
    }

    pub fn debil(&self) -> Weak<RwLock<VistaVendedores>> {
        Arc::downgrade(&self.actual())
    }
}

async fn atender_accion(
    vista: Weak<RwLock<VistaVendedores>>,
    mapa: Arc<Mutex<RenderizadorMapa>>,
    accion: AccionMapa,
) -> AppResult<bool> {
    let Some(vista) = vista.upgrade() else {
        return Ok(false);
    };
    match accion {
        AccionMapa::ActualizarUbicacion { id, lat, lng, precision } => {
            let ubicacion = UbicacionRequest { lat, lng, precision };
            actualizar_ubicacion(&vista, &mapa, &id, ubicacion).await?;
        }
        AccionMapa::Seleccionar { id } => {
            seleccionar(&vista, &mapa, &id).await?;
        }
    }
    Ok(true)
}

/// Estado numérico que entiende el API remoto
fn estado_remoto(estado: Option<&str>) -> Option<i32> {
    match estado.map(|e| e.trim().to_lowercase()).as_deref() {
        Some("activo") => Some(1),
        Some("inactivo") => Some(0),
        _ => None,
    }
}

/// Carga una página del API remoto. Si falla, la vista conserva los datos
/// previos y muestra el error; no hay reintento automático.
pub async fn cargar(
    vista: Weak<RwLock<VistaVendedores>>,
    auth: &AuthService,
    solicitud: CargarVendedoresRequest,
    tamanio_pagina: u32,
) -> AppResult<usize> {
    match vista.upgrade() {
        Some(v) => {
            let mut v = v.write().await;
            v.cargando = true;
            v.error = None;
        }
        None => {
            tracing::debug!("📭 Vista de vendedores desmontada, carga cancelada");
            return Ok(0);
        }
    }

    let api = auth.api().clone();
    let termino = solicitud
        .termino
        .clone()
        .filter(|t| !t.trim().is_empty());
    let resultado = auth
        .con_sesion(|sesion, empresa| async move {
            let request = VendedorRequest {
                id_empresa: empresa.id,
                pagina: solicitud.pagina.unwrap_or(1).max(1),
                tamanio_pagina,
                termino,
                estado: estado_remoto(solicitud.estado.as_deref()),
            };
            api.get_vendedores(&sesion.token, &request).await
        })
        .await;

    let Some(vista) = vista.upgrade() else {
        tracing::debug!("📭 Respuesta de vendedores descartada: la vista ya no existe");
        return Ok(0);
    };

    match resultado {
        Ok(respuesta) => {
            let vendedores: Vec<Vendedor> = {
                let mut rng = rand::thread_rng();
                respuesta
                    .vendedores
                    .into_iter()
                    .map(|api| Vendedor::desde_api(api, &mut rng))
                    .collect()
            };
            let total = vendedores.len();

            let mut v = vista.write().await;
            v.vendedores = vendedores;
            v.paginacion = Some(respuesta.paginacion);
            v.cargando = false;
            tracing::info!("✅ {} vendedores cargados", total);
            Ok(total)
        }
        Err(e) => {
            let mut v = vista.write().await;
            v.cargando = false;
            v.error = Some(e.mensaje_usuario());
            Err(e)
        }
    }
}

/// Marca el vendedor como seleccionado, redibuja y centra en él
pub async fn seleccionar(
    vista: &Arc<RwLock<VistaVendedores>>,
    mapa: &Arc<Mutex<RenderizadorMapa>>,
    id: &str,
) -> AppResult<()> {
    let mut v = vista.write().await;
    if !v.vendedores.iter().any(|x| x.id == id) {
        return Err(AppError::NotFound(MSG_VENDEDOR_NO_ENCONTRADO.to_string()));
    }
    let anterior = v.seleccionado.replace(id.to_string());

    let mut mapa = mapa.lock().await;
    let resultado = v.dibujar(&mut mapa).and_then(|_| mapa.centrar_en(id));
    match resultado {
        Ok(()) => Ok(()),
        Err(MapaError::NoListo) => {
            tracing::debug!("🗺️ Mapa no listo, {} se resaltará al redibujar", id);
            Ok(())
        }
        Err(e) => {
            // el vendedor no está a la vista: se restaura la selección previa
            v.seleccionado = anterior;
            if let Err(redibujo) = v.dibujar(&mut mapa) {
                tracing::warn!("⚠️ No se pudo restaurar el mapa de vendedores: {}", redibujo);
            }
            Err(e.into())
        }
    }
}

/// Actualiza la posición local del vendedor con la del dispositivo
pub async fn actualizar_ubicacion(
    vista: &Arc<RwLock<VistaVendedores>>,
    mapa: &Arc<Mutex<RenderizadorMapa>>,
    id: &str,
    ubicacion: UbicacionRequest,
) -> AppResult<ActualizacionUbicacion> {
    let mut v = vista.write().await;
    let vendedor = v
        .vendedores
        .iter_mut()
        .find(|x| x.id == id)
        .ok_or_else(|| AppError::NotFound(MSG_VENDEDOR_NO_ENCONTRADO.to_string()))?;

    let (Some(lat), Some(lng)) = (ubicacion.lat, ubicacion.lng) else {
        return Err(AppError::GeolocationUnavailable(MSG_SIN_GEOLOCALIZACION.to_string()));
    };
    validate_coordinates(lat, lng).map_err(|_| validation_error("Coordenadas fuera de rango"))?;

    vendedor.lat = lat;
    vendedor.lng = lng;

    let actualizacion = ActualizacionUbicacion {
        vendedor_id: vendedor.id.clone(),
        coordenadas: Coordenadas {
            latitud: lat,
            longitud: lng,
            precision: ubicacion.precision,
            fecha_actualizacion: chrono::Utc::now().to_rfc3339(),
        },
    };
    // TODO: enviar al API remoto cuando exponga el endpoint de ubicación
    tracing::info!(
        "🎯 Nueva ubicación de {}: ({}, {}) ±{:?}m",
        actualizacion.vendedor_id,
        lat,
        lng,
        ubicacion.precision
    );

    let mut mapa = mapa.lock().await;
    match v.dibujar(&mut mapa) {
        Ok(_) => mapa.centrar_en_punto(Punto::new(lat, lng), ZOOM_UBICACION)?,
        Err(MapaError::NoListo) => {
            tracing::debug!("🗺️ Mapa no listo, la ubicación se verá al redibujar");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(actualizacion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ApiClient;
    use crate::models::auth::{Empresa, Sesion};
    use crate::models::mapa::VistaMapa;
    use crate::models::vendedor::EstadoVendedor;
    use crate::utils::jwt::tests::token_con_exp;
    use crate::utils::storage::AlmacenLocal;

    fn vendedor(id: &str) -> Vendedor {
        Vendedor {
            id: id.to_string(),
            codigo: id.to_string(),
            nombre: "Luis".to_string(),
            apellidos: Some("Platazo".to_string()),
            telefono: None,
            telefono2: None,
            direccion: None,
            distrito: None,
            ruc: None,
            zona: None,
            ciudad: Some("Quito".to_string()),
            representante: None,
            lat: -0.18,
            lng: -78.46,
            estado: EstadoVendedor::Activo,
            comision: None,
            fecha_registro: None,
            ventas_hoy: 0,
            clientes_visitados: 0,
        }
    }

    async fn mapa_listo() -> Arc<Mutex<RenderizadorMapa>> {
        let mapa = Arc::new(Mutex::new(RenderizadorMapa::en_memoria()));
        mapa.lock().await.reportar_contenedor(800, 600);
        let politica = crate::utils::retry::PoliticaReintento::new(1, std::time::Duration::from_millis(1));
        crate::services::mapa_service::inicializar(&mapa, &politica).await.unwrap();
        mapa
    }

    async fn auth_con_empresa() -> AuthService {
        let auth = AuthService::new(
            ApiClient::new("http://127.0.0.1:9").unwrap(),
            AlmacenLocal::memoria(),
        );
        auth.establecer(Sesion {
            username: "demo".to_string(),
            token: token_con_exp(chrono::Utc::now().timestamp() + 600),
            empresa_seleccionada: Some(Empresa { id: 1, nomempresa: "Andina".to_string(), flag: true }),
            empresas: vec![],
        })
        .await
        .unwrap();
        auth
    }

    #[tokio::test]
    async fn test_remontar_suelta_la_suscripcion_anterior() {
        let eventos = RegistroEventos::new();
        let montaje = MontajeVendedores::new();
        let mapa = mapa_listo().await;

        let primera = montaje.montar(&eventos, mapa.clone());
        assert!(primera.read().await.suscrita());
        let debil = Arc::downgrade(&primera);
        drop(primera);

        montaje.montar(&eventos, mapa);
        assert!(debil.upgrade().is_none());
        assert_eq!(eventos.suscritos(VistaMapaId::Vendedores), 1);
    }

    #[tokio::test]
    async fn test_carga_tras_desmontar_se_descarta() {
        let eventos = RegistroEventos::new();
        let montaje = MontajeVendedores::new();
        let mapa = mapa_listo().await;
        montaje.montar(&eventos, mapa.clone());
        let debil = montaje.debil();
        montaje.montar(&eventos, mapa);

        let auth = auth_con_empresa().await;
        let cargados = cargar(debil, &auth, CargarVendedoresRequest::default(), 20).await.unwrap();
        assert_eq!(cargados, 0);
    }

    #[tokio::test]
    async fn test_error_de_carga_conserva_datos() {
        let montaje = MontajeVendedores::new();
        let vista = montaje.vista();
        vista.write().await.vendedores = vec![vendedor("V001")];

        let auth = auth_con_empresa().await;
        let resultado = cargar(montaje.debil(), &auth, CargarVendedoresRequest::default(), 20).await;
        assert!(matches!(resultado, Err(AppError::Network(_))));

        let v = vista.read().await;
        assert!(!v.cargando);
        assert_eq!(v.vendedores.len(), 1);
        assert_eq!(
            v.error.as_deref(),
            Some("Error de conexión. Verifica tu conexión a internet.")
        );
    }

    #[tokio::test]
    async fn test_actualizar_ubicacion() {
        let montaje = MontajeVendedores::new();
        let vista = montaje.vista();
        vista.write().await.vendedores = vec![vendedor("V001")];
        let mapa = mapa_listo().await;

        let sin_gps = actualizar_ubicacion(&vista, &mapa, "V001", UbicacionRequest::default()).await;
        assert!(matches!(sin_gps, Err(AppError::GeolocationUnavailable(_))));

        let inexistente = actualizar_ubicacion(&vista, &mapa, "V999", UbicacionRequest::default()).await;
        match inexistente {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, MSG_VENDEDOR_NO_ENCONTRADO),
            otro => panic!("se esperaba NotFound, llegó {:?}", otro.map(|a| a.vendedor_id)),
        }

        let ubicacion = UbicacionRequest { lat: Some(-0.2), lng: Some(-78.5), precision: Some(12.0) };
        let payload = actualizar_ubicacion(&vista, &mapa, "V001", ubicacion).await.unwrap();
        assert_eq!(payload.coordenadas.latitud, -0.2);
        assert_eq!(vista.read().await.vendedores[0].lat, -0.2);
        assert_eq!(
            mapa.lock().await.superficie().vista(),
            &VistaMapa::Centro { centro: Punto::new(-0.2, -78.5), zoom: ZOOM_UBICACION }
        );
    }

    #[tokio::test]
    async fn test_accion_de_popup_llega_a_la_vista_montada() {
        let eventos = RegistroEventos::new();
        let montaje = MontajeVendedores::new();
        let mapa = mapa_listo().await;
        let vista = montaje.montar(&eventos, mapa.clone());
        vista.write().await.vendedores = vec![vendedor("V001"), vendedor("V002")];

        eventos
            .despachar(VistaMapaId::Vendedores, AccionMapa::Seleccionar { id: "V002".to_string() })
            .await
            .unwrap();
        assert_eq!(vista.read().await.seleccionado.as_deref(), Some("V002"));
        assert!(mapa.lock().await.superficie().popup_abierto().is_some());
    }

    #[tokio::test]
    async fn test_seleccionar_con_mapa_no_listo_se_difiere() {
        let montaje = MontajeVendedores::new();
        let vista = montaje.vista();
        vista.write().await.vendedores = vec![vendedor("V001"), vendedor("V002")];
        let mapa = Arc::new(Mutex::new(RenderizadorMapa::en_memoria()));

        seleccionar(&vista, &mapa, "V001").await.unwrap();
        assert_eq!(vista.read().await.seleccionado.as_deref(), Some("V001"));
        assert!(mapa.lock().await.superficie().capas().is_empty());

        // al quedar listo, el redibujo ya muestra la selección
        let mapa = mapa_listo().await;
        seleccionar(&vista, &mapa, "V001").await.unwrap();
        assert!(mapa.lock().await.superficie().popup_abierto().is_some());
    }

    #[tokio::test]
    async fn test_seleccionar_vendedor_filtrado_conserva_la_seleccion() {
        let montaje = MontajeVendedores::new();
        let vista = montaje.vista();
        {
            let mut v = vista.write().await;
            let mut inactivo = vendedor("V002");
            inactivo.estado = EstadoVendedor::Inactivo;
            v.vendedores = vec![vendedor("V001"), inactivo];
            v.filtros.estado = Some(EstadoVendedor::Activo);
        }
        let mapa = mapa_listo().await;
        seleccionar(&vista, &mapa, "V001").await.unwrap();

        let oculto = seleccionar(&vista, &mapa, "V002").await;
        assert!(oculto.is_err());
        assert_eq!(vista.read().await.seleccionado.as_deref(), Some("V001"));
    }

    #[test]
    fn test_estado_remoto() {
        assert_eq!(estado_remoto(Some("activo")), Some(1));
        assert_eq!(estado_remoto(Some("Inactivo")), Some(0));
        assert_eq!(estado_remoto(Some("todos")), None);
        assert_eq!(estado_remoto(None), None);
    }
}
