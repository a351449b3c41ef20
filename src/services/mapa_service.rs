//! Renderizado de mapas
//!
//! El widget de mapa del front-end se abstrae detrás de [`SuperficieMapa`].
//! Cada vista (geocercas, vendedores, registros) tiene su propio
//! [`RenderizadorMapa`], que en cada mutación limpia las capas de entidades y
//! las vuelve a dibujar completas.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::geocerca::{Geocerca, Punto};
use crate::models::mapa::{
    Capa, Estilo, Figura, GrupoCapa, Icono, Popup, VistaMapa, VistaMapaId, CENTRO_DEFAULT,
    ZOOM_DEFAULT, ZOOM_DETALLE,
};
use crate::models::registro::Registro;
use crate::models::vendedor::Vendedor;
use crate::utils::errors::AppError;
use crate::utils::retry::{reintentar, PoliticaReintento};

pub const MSG_INICIALIZACION_FALLIDA: &str =
    "Error: No se pudo inicializar automáticamente. Usa el botón \"🔄 Inicializar Mapa\"";

/// Margen al encuadrar varios marcadores
pub const MARGEN_AJUSTE: f64 = 0.1;

#[derive(Debug, Error)]
pub enum MapaError {
    #[error("El mapa aún no está listo")]
    NoListo,

    #[error("El contenedor del mapa no tiene dimensiones")]
    ContenedorSinDimensiones,

    #[error("'{0}' no está dibujado en el mapa")]
    EntidadNoDibujada(String),
}

impl From<MapaError> for AppError {
    fn from(e: MapaError) -> Self {
        match e {
            MapaError::NoListo | MapaError::ContenedorSinDimensiones => {
                AppError::MapNotReady(e.to_string())
            }
            MapaError::EntidadNoDibujada(_) => AppError::NotFound(e.to_string()),
        }
    }
}

/// Estado visible de un mapa
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "estado", rename_all = "camelCase")]
pub enum EstadoMapa {
    Inicializando { intento: u32 },
    Listo,
    Error { mensaje: String },
}

/// Costura con el widget de mapa
pub trait SuperficieMapa: Send + Sync {
    /// El contenedor tiene ancho y alto distintos de cero
    fn esta_lista(&self) -> bool;
    fn reportar_contenedor(&mut self, ancho: u32, alto: u32);
    /// Agrega una capa y devuelve su id
    fn agregar_capa(&mut self, capa: Capa) -> String;
    fn quitar_capa(&mut self, id: &str) -> bool;
    fn abrir_popup(&mut self, id: &str) -> bool;
    fn popup_abierto(&self) -> Option<&str>;
    fn fijar_vista(&mut self, vista: VistaMapa);
    fn vista(&self) -> &VistaMapa;
    fn capas(&self) -> &[Capa];
}

/// Superficie que solo registra las capas; el front-end dibuja su snapshot
#[derive(Debug, Default)]
pub struct CapasEnMemoria {
    dimensiones: Option<(u32, u32)>,
    capas: Vec<Capa>,
    siguiente_id: u64,
    vista: VistaMapa,
    popup_abierto: Option<String>,
}

impl CapasEnMemoria {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SuperficieMapa for CapasEnMemoria {
    fn esta_lista(&self) -> bool {
        matches!(self.dimensiones, Some((ancho, alto)) if ancho > 0 && alto > 0)
    }

    fn reportar_contenedor(&mut self, ancho: u32, alto: u32) {
        self.dimensiones = Some((ancho, alto));
    }

    fn agregar_capa(&mut self, mut capa: Capa) -> String {
        self.siguiente_id += 1;
        capa.id = format!("capa-{}", self.siguiente_id);
        let id = capa.id.clone();
        self.capas.push(capa);
        id
    }

    fn quitar_capa(&mut self, id: &str) -> bool {
        let antes = self.capas.len();
        self.capas.retain(|c| c.id != id);
        if self.popup_abierto.as_deref() == Some(id) {
            self.popup_abierto = None;
        }
        self.capas.len() != antes
    }

    fn abrir_popup(&mut self, id: &str) -> bool {
        let existe = self.capas.iter().any(|c| c.id == id && c.popup.is_some());
        if existe {
            self.popup_abierto = Some(id.to_string());
        }
        existe
    }

    fn popup_abierto(&self) -> Option<&str> {
        self.popup_abierto.as_deref()
    }

    fn fijar_vista(&mut self, vista: VistaMapa) {
        self.vista = vista;
    }

    fn vista(&self) -> &VistaMapa {
        &self.vista
    }

    fn capas(&self) -> &[Capa] {
        &self.capas
    }
}

/// Entidades que saben describirse como capas
pub trait Dibujable {
    fn capas(&self) -> Vec<Capa>;
}

/// Geocerca a dibujar; si está en edición de vértices se usan los vértices en vivo
pub struct GeocercaEnMapa<'a> {
    pub geocerca: &'a Geocerca,
    pub vertices_en_edicion: Option<&'a [Punto]>,
}

impl Dibujable for GeocercaEnMapa<'_> {
    fn capas(&self) -> Vec<Capa> {
        let g = self.geocerca;
        let id = Some(g.id.as_str());
        let estilo = Estilo::para_geocerca(&g.color, g.activa);

        let marcador = Capa::new(
            GrupoCapa::Entidad,
            id,
            Figura::Marcador {
                posicion: g.ancla(),
                icono: Icono::geocerca(g),
                arrastrable: false,
                titulo: Some(g.nombre.clone()),
            },
        )
        .con_popup(Popup::Geocerca(g.clone()));

        let figura = match self.vertices_en_edicion {
            Some(vertices) => Figura::Poligono {
                puntos: vertices.to_vec(),
                estilo,
            },
            None => Figura::de_geometria(g.ancla(), &g.geometria, estilo),
        };

        let mut capas = vec![marcador, Capa::new(GrupoCapa::Entidad, id, figura)];

        if let Some(vertices) = self.vertices_en_edicion {
            capas.extend(vertices.iter().enumerate().map(|(indice, punto)| {
                Capa::new(
                    GrupoCapa::Vertice,
                    id,
                    Figura::Marcador {
                        posicion: *punto,
                        icono: Icono::vertice(indice),
                        arrastrable: true,
                        titulo: Some(format!("Vértice {}", indice + 1)),
                    },
                )
            }));
        }

        capas
    }
}

pub struct VendedorEnMapa<'a> {
    pub vendedor: &'a Vendedor,
    pub seleccionado: bool,
}

impl Dibujable for VendedorEnMapa<'_> {
    fn capas(&self) -> Vec<Capa> {
        let v = self.vendedor;
        vec![Capa::new(
            GrupoCapa::Entidad,
            Some(v.id.as_str()),
            Figura::Marcador {
                posicion: v.posicion(),
                icono: Icono::vendedor(v, self.seleccionado),
                arrastrable: false,
                titulo: Some(v.nombre_completo()),
            },
        )
        .con_popup(Popup::Vendedor(v.clone()))]
    }
}

impl Dibujable for Registro {
    fn capas(&self) -> Vec<Capa> {
        vec![Capa::new(
            GrupoCapa::Entidad,
            Some(self.id.as_str()),
            Figura::Marcador {
                posicion: Punto::new(self.lat, self.lng),
                icono: Icono::registro(self),
                arrastrable: false,
                titulo: Some(self.vendedor.clone()),
            },
        )
        .con_popup(Popup::Registro(self.clone()))]
    }
}

pub struct RenderizadorMapa {
    superficie: Box<dyn SuperficieMapa>,
    estado: EstadoMapa,
}

impl RenderizadorMapa {
    pub fn new(superficie: Box<dyn SuperficieMapa>) -> Self {
        Self {
            superficie,
            estado: EstadoMapa::Inicializando { intento: 0 },
        }
    }

    pub fn en_memoria() -> Self {
        Self::new(Box::new(CapasEnMemoria::new()))
    }

    pub fn estado(&self) -> &EstadoMapa {
        &self.estado
    }

    pub fn esta_listo(&self) -> bool {
        self.estado == EstadoMapa::Listo && self.superficie.esta_lista()
    }

    pub fn superficie(&self) -> &dyn SuperficieMapa {
        self.superficie.as_ref()
    }

    pub fn reportar_contenedor(&mut self, ancho: u32, alto: u32) {
        self.superficie.reportar_contenedor(ancho, alto);
    }

    fn asegurar_listo(&self) -> Result<(), MapaError> {
        if self.esta_listo() {
            Ok(())
        } else {
            Err(MapaError::NoListo)
        }
    }

    fn limpiar_grupos(&mut self, grupos: &[GrupoCapa]) {
        let ids: Vec<String> = self
            .superficie
            .capas()
            .iter()
            .filter(|c| grupos.contains(&c.grupo))
            .map(|c| c.id.clone())
            .collect();
        for id in ids {
            self.superficie.quitar_capa(&id);
        }
    }

    /// Limpia todas las capas de entidades y dibuja `items`. Devuelve cuántas capas agregó.
    pub fn renderizar<T: Dibujable>(&mut self, items: &[T]) -> Result<usize, MapaError> {
        self.asegurar_listo()?;
        self.limpiar_grupos(&[GrupoCapa::Entidad, GrupoCapa::Vertice]);

        let mut total = 0;
        for item in items {
            for capa in item.capas() {
                self.superficie.agregar_capa(capa);
                total += 1;
            }
        }
        tracing::debug!("🗺️ {} capas dibujadas para {} entidades", total, items.len());
        Ok(total)
    }

    /// Reemplaza la vista previa del borrador
    pub fn renderizar_temporal(&mut self, capas: Vec<Capa>) -> Result<(), MapaError> {
        self.asegurar_listo()?;
        self.limpiar_grupos(&[GrupoCapa::Temporal]);
        for capa in capas {
            self.superficie.agregar_capa(capa);
        }
        Ok(())
    }

    /// Centra en la entidad con zoom de detalle y abre su popup
    pub fn centrar_en(&mut self, entidad: &str) -> Result<(), MapaError> {
        self.asegurar_listo()?;
        let (id, posicion) = self
            .superficie
            .capas()
            .iter()
            .find(|c| c.figura.es_marcador() && c.entidad.as_deref() == Some(entidad))
            .map(|c| (c.id.clone(), c.figura.posicion()))
            .ok_or_else(|| MapaError::EntidadNoDibujada(entidad.to_string()))?;

        self.superficie.fijar_vista(VistaMapa::Centro {
            centro: posicion,
            zoom: ZOOM_DETALLE,
        });
        self.superficie.abrir_popup(&id);
        Ok(())
    }

    pub fn centrar_en_punto(&mut self, punto: Punto, zoom: u8) -> Result<(), MapaError> {
        self.asegurar_listo()?;
        self.superficie.fijar_vista(VistaMapa::Centro { centro: punto, zoom });
        Ok(())
    }

    /// Encuadra los marcadores dibujados. Devuelve `false` si no hay ninguno.
    pub fn ajustar_vista(&mut self, margen: f64) -> Result<bool, MapaError> {
        self.asegurar_listo()?;
        let posiciones: Vec<Punto> = self
            .superficie
            .capas()
            .iter()
            .filter(|c| c.grupo == GrupoCapa::Entidad && c.figura.es_marcador())
            .map(|c| c.figura.posicion())
            .collect();

        let vista = match posiciones.as_slice() {
            [] => return Ok(false),
            [unico] => VistaMapa::Centro {
                centro: *unico,
                zoom: ZOOM_DETALLE,
            },
            varios => {
                let mut suroeste = varios[0];
                let mut noreste = varios[0];
                for p in varios {
                    suroeste.lat = suroeste.lat.min(p.lat);
                    suroeste.lng = suroeste.lng.min(p.lng);
                    noreste.lat = noreste.lat.max(p.lat);
                    noreste.lng = noreste.lng.max(p.lng);
                }
                VistaMapa::Limites {
                    suroeste,
                    noreste,
                    margen,
                }
            }
        };
        self.superficie.fijar_vista(vista);
        Ok(true)
    }

    /// Vuelve al centro por defecto
    pub fn centrar_mapa(&mut self) -> Result<(), MapaError> {
        self.centrar_en_punto(CENTRO_DEFAULT, ZOOM_DEFAULT)
    }

    /// Marcador temporal de un resultado de búsqueda
    pub fn mostrar_lugar(&mut self, punto: Punto, nombre: &str, direccion: &str) -> Result<(), MapaError> {
        self.asegurar_listo()?;
        self.limpiar_grupos(&[GrupoCapa::Busqueda]);
        let capa = Capa::new(
            GrupoCapa::Busqueda,
            None,
            Figura::Marcador {
                posicion: punto,
                icono: Icono::lugar(),
                arrastrable: false,
                titulo: Some(nombre.to_string()),
            },
        )
        .con_popup(Popup::Lugar {
            nombre: nombre.to_string(),
            direccion: direccion.to_string(),
        });
        let id = self.superficie.agregar_capa(capa);
        self.superficie.fijar_vista(VistaMapa::Centro {
            centro: punto,
            zoom: ZOOM_DETALLE,
        });
        self.superficie.abrir_popup(&id);
        Ok(())
    }

    pub fn capas_de_grupo(&self, grupo: GrupoCapa) -> usize {
        self.superficie.capas().iter().filter(|c| c.grupo == grupo).count()
    }
}

/// Inicializa el mapa con reintentos acotados. Al agotarse deja el estado en
/// error persistente hasta que se reintente manualmente.
///
/// El lock no se mantiene durante las esperas entre intentos.
pub async fn inicializar(
    mapa: &Arc<Mutex<RenderizadorMapa>>,
    politica: &PoliticaReintento,
) -> Result<(), MapaError> {
    let resultado = reintentar(politica, |intento| {
        let mapa = mapa.clone();
        async move {
            let mut m = mapa.lock().await;
            m.estado = EstadoMapa::Inicializando { intento };
            if m.superficie.esta_lista() {
                m.estado = EstadoMapa::Listo;
                Ok(())
            } else {
                Err(MapaError::ContenedorSinDimensiones)
            }
        }
    })
    .await;

    if let Err(e) = &resultado {
        tracing::warn!("⚠️ Inicialización del mapa fallida: {}", e);
        mapa.lock().await.estado = EstadoMapa::Error {
            mensaje: MSG_INICIALIZACION_FALLIDA.to_string(),
        };
    } else {
        tracing::info!("🗺️ Mapa inicializado");
    }
    resultado
}

/// Un renderizador por vista
#[derive(Clone)]
pub struct Mapas {
    mapas: HashMap<VistaMapaId, Arc<Mutex<RenderizadorMapa>>>,
}

impl Mapas {
    pub fn en_memoria() -> Self {
        let mapas = VistaMapaId::TODAS
            .iter()
            .map(|vista| (*vista, Arc::new(Mutex::new(RenderizadorMapa::en_memoria()))))
            .collect();
        Self { mapas }
    }

    pub fn get(&self, vista: VistaMapaId) -> Arc<Mutex<RenderizadorMapa>> {
        match self.mapas.get(&vista) {
            Some(mapa) => mapa.clone(),
            // todas las vistas se crean en el constructor
            None => Arc::new(Mutex::new(RenderizadorMapa::en_memoria())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geocerca::geocercas_semilla;
    use crate::models::registro::registros_semilla;
    use std::time::Duration;

    fn mapa_listo() -> RenderizadorMapa {
        let mut mapa = RenderizadorMapa::en_memoria();
        mapa.reportar_contenedor(800, 600);
        mapa.estado = EstadoMapa::Listo;
        mapa
    }

    fn dibujables(geocercas: &[Geocerca]) -> Vec<GeocercaEnMapa<'_>> {
        geocercas
            .iter()
            .map(|geocerca| GeocercaEnMapa {
                geocerca,
                vertices_en_edicion: None,
            })
            .collect()
    }

    #[test]
    fn test_renderizar_es_idempotente() {
        let semilla = geocercas_semilla();
        let mut mapa = mapa_listo();

        let primera = mapa.renderizar(&dibujables(&semilla)).unwrap();
        let capas = mapa.superficie().capas().len();
        let segunda = mapa.renderizar(&dibujables(&semilla)).unwrap();

        assert_eq!(primera, segunda);
        assert_eq!(capas, mapa.superficie().capas().len());
        // un marcador y una figura por geocerca
        assert_eq!(capas, semilla.len() * 2);
        assert!(mapa.superficie().popup_abierto().is_none());
    }

    #[test]
    fn test_renderizar_sin_contenedor_se_difiere() {
        let mut mapa = RenderizadorMapa::en_memoria();
        let semilla = geocercas_semilla();
        assert!(matches!(mapa.renderizar(&dibujables(&semilla)), Err(MapaError::NoListo)));
        assert!(mapa.superficie().capas().is_empty());
    }

    #[test]
    fn test_activa_solo_cambia_opacidades() {
        let mut g = geocercas_semilla().remove(0);
        let activa = GeocercaEnMapa { geocerca: &g, vertices_en_edicion: None }.capas();
        let estilo_activa = activa[1].figura.estilo().cloned().unwrap();

        g.activa = false;
        let inactiva = GeocercaEnMapa { geocerca: &g, vertices_en_edicion: None }.capas();
        let estilo_inactiva = inactiva[1].figura.estilo().cloned().unwrap();

        assert_eq!(estilo_activa.color, estilo_inactiva.color);
        assert_eq!(estilo_activa.weight, estilo_inactiva.weight);
        assert_eq!((estilo_inactiva.fill_opacity, estilo_inactiva.opacity), (0.1, 0.5));
        assert_eq!(activa[0].figura, inactiva[0].figura);
    }

    #[test]
    fn test_geocerca_en_edicion_usa_vertices_en_vivo() {
        let g = geocercas_semilla().remove(2);
        let vivos = vec![Punto::new(0.0, 0.0), Punto::new(0.1, 0.0), Punto::new(0.1, 0.1)];
        let capas = GeocercaEnMapa {
            geocerca: &g,
            vertices_en_edicion: Some(vivos.as_slice()),
        }
        .capas();

        assert!(matches!(&capas[1].figura, Figura::Poligono { puntos, .. } if puntos == &vivos));
        let manijas: Vec<_> = capas.iter().filter(|c| c.grupo == GrupoCapa::Vertice).collect();
        assert_eq!(manijas.len(), 3);
        assert!(manijas
            .iter()
            .all(|c| matches!(c.figura, Figura::Marcador { arrastrable: true, .. })));
    }

    #[test]
    fn test_renderizar_no_toca_la_vista_previa() {
        let semilla = geocercas_semilla();
        let mut mapa = mapa_listo();
        mapa.renderizar_temporal(vec![Capa::new(
            GrupoCapa::Temporal,
            None,
            Figura::Marcador {
                posicion: Punto::new(0.0, 0.0),
                icono: Icono::numerado(1),
                arrastrable: false,
                titulo: None,
            },
        )])
        .unwrap();
        mapa.renderizar(&dibujables(&semilla)).unwrap();
        assert_eq!(mapa.capas_de_grupo(GrupoCapa::Temporal), 1);

        mapa.renderizar_temporal(Vec::new()).unwrap();
        assert_eq!(mapa.capas_de_grupo(GrupoCapa::Temporal), 0);
    }

    #[test]
    fn test_centrar_en_abre_popup() {
        let semilla = geocercas_semilla();
        let mut mapa = mapa_listo();
        mapa.renderizar(&dibujables(&semilla)).unwrap();

        mapa.centrar_en("gc-002").unwrap();
        assert_eq!(
            mapa.superficie().vista(),
            &VistaMapa::Centro { centro: semilla[1].ancla(), zoom: ZOOM_DETALLE }
        );
        assert!(mapa.superficie().popup_abierto().is_some());
        assert!(matches!(mapa.centrar_en("gc-999"), Err(MapaError::EntidadNoDibujada(_))));
    }

    #[test]
    fn test_ajustar_vista() {
        let mut mapa = mapa_listo();
        assert!(!mapa.ajustar_vista(MARGEN_AJUSTE).unwrap());

        let registros = registros_semilla();
        mapa.renderizar(&registros[..1]).unwrap();
        mapa.ajustar_vista(MARGEN_AJUSTE).unwrap();
        assert!(matches!(mapa.superficie().vista(), VistaMapa::Centro { zoom: 16, .. }));

        mapa.renderizar(&registros).unwrap();
        mapa.ajustar_vista(0.12).unwrap();
        match mapa.superficie().vista() {
            VistaMapa::Limites { suroeste, noreste, margen } => {
                assert_eq!(*margen, 0.12);
                assert_eq!(suroeste.lat, -0.186879);
                assert_eq!(noreste.lat, -0.1567);
            }
            otra => panic!("se esperaban límites, llegó {:?}", otra),
        }
    }

    #[test]
    fn test_mostrar_lugar_reemplaza_el_anterior() {
        let mut mapa = mapa_listo();
        mapa.mostrar_lugar(Punto::new(-2.19, -79.88), "Guayaquil", "Guayas").unwrap();
        mapa.mostrar_lugar(Punto::new(-2.90, -79.00), "Cuenca", "Azuay").unwrap();
        assert_eq!(mapa.capas_de_grupo(GrupoCapa::Busqueda), 1);
        assert!(mapa.superficie().popup_abierto().is_some());
    }

    #[tokio::test]
    async fn test_inicializar_agota_reintentos() {
        let mapa = Arc::new(Mutex::new(RenderizadorMapa::en_memoria()));
        let politica = PoliticaReintento::new(3, Duration::from_millis(1));

        assert!(inicializar(&mapa, &politica).await.is_err());
        assert_eq!(
            mapa.lock().await.estado(),
            &EstadoMapa::Error { mensaje: MSG_INICIALIZACION_FALLIDA.to_string() }
        );

        mapa.lock().await.reportar_contenedor(640, 480);
        inicializar(&mapa, &politica).await.unwrap();
        assert!(mapa.lock().await.esta_listo());
    }

    #[tokio::test]
    async fn test_contenedor_con_alto_cero_no_esta_listo() {
        let mapa = Arc::new(Mutex::new(RenderizadorMapa::en_memoria()));
        mapa.lock().await.reportar_contenedor(640, 0);
        let politica = PoliticaReintento::new(1, Duration::from_millis(1));
        assert!(matches!(
            inicializar(&mapa, &politica).await,
            Err(MapaError::ContenedorSinDimensiones)
        ));
    }
}
