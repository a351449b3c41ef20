//! Modelos del mapa
//!
//! Descripción serializable de lo que el front-end debe dibujar: capas
//! (marcadores, círculos, polígonos), estilos, iconos y popups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::geocerca::{Geocerca, Geometria, Punto};
use crate::models::registro::Registro;
use crate::models::vendedor::{EstadoVendedor, Vendedor};

/// Centro por defecto del mapa (Quito)
pub const CENTRO_DEFAULT: Punto = Punto {
    lat: -0.186879,
    lng: -78.503194,
};
pub const ZOOM_DEFAULT: u8 = 12;
/// Zoom al centrar en una entidad o en un único marcador
pub const ZOOM_DETALLE: u8 = 16;
pub const COLOR_TEMPORAL: &str = "#3b82f6";

/// Vistas con mapa propio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VistaMapaId {
    Geocercas,
    Vendedores,
    Registros,
}

impl VistaMapaId {
    pub const TODAS: [VistaMapaId; 3] = [
        VistaMapaId::Geocercas,
        VistaMapaId::Vendedores,
        VistaMapaId::Registros,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VistaMapaId::Geocercas => "geocercas",
            VistaMapaId::Vendedores => "vendedores",
            VistaMapaId::Registros => "registros",
        }
    }
}

impl fmt::Display for VistaMapaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VistaMapaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geocercas" => Ok(VistaMapaId::Geocercas),
            "vendedores" => Ok(VistaMapaId::Vendedores),
            "registros" => Ok(VistaMapaId::Registros),
            otro => Err(format!("Vista de mapa desconocida: {}", otro)),
        }
    }
}

/// Estilo de trazo y relleno de una figura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estilo {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub opacity: f64,
    pub weight: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

impl Estilo {
    /// Estilo de una geocerca persistida: la opacidad depende solo de `activa`
    pub fn para_geocerca(color: &str, activa: bool) -> Self {
        Self {
            color: color.to_string(),
            fill_color: color.to_string(),
            fill_opacity: if activa { 0.2 } else { 0.1 },
            opacity: if activa { 1.0 } else { 0.5 },
            weight: 2,
            dash_array: None,
        }
    }

    /// Estilo discontinuo de la vista previa
    pub fn temporal() -> Self {
        Self {
            color: COLOR_TEMPORAL.to_string(),
            fill_color: COLOR_TEMPORAL.to_string(),
            fill_opacity: 0.3,
            opacity: 1.0,
            weight: 2,
            dash_array: Some("5, 5".to_string()),
        }
    }
}

/// Icono de un marcador
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icono {
    /// Contenido principal (emoji, inicial o número)
    pub contenido: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insignia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fondo_insignia: Option<String>,
    pub tamanio: u32,
    #[serde(default)]
    pub resaltado: bool,
}

impl Icono {
    pub fn geocerca(g: &Geocerca) -> Self {
        Self {
            contenido: g.tipo.icono().to_string(),
            color: g.color.clone(),
            insignia: Some(g.forma().icono().to_string()),
            fondo_insignia: Some("#ffffff".to_string()),
            tamanio: 30,
            resaltado: false,
        }
    }

    pub fn vendedor(v: &Vendedor, seleccionado: bool) -> Self {
        let colores = ColoresEstado::de(Some(v.estado));
        Self {
            contenido: v.inicial(),
            color: colores.color.to_string(),
            insignia: Some(colores.icono.to_string()),
            fondo_insignia: Some(colores.fondo.to_string()),
            tamanio: 50,
            resaltado: seleccionado,
        }
    }

    pub fn registro(r: &Registro) -> Self {
        Self {
            contenido: r.inicial(),
            color: r.color().to_string(),
            insignia: None,
            fondo_insignia: None,
            tamanio: 28,
            resaltado: false,
        }
    }

    /// Marcador numerado del borrador de círculo
    pub fn numerado(numero: usize) -> Self {
        Self {
            contenido: numero.to_string(),
            color: COLOR_TEMPORAL.to_string(),
            insignia: None,
            fondo_insignia: None,
            tamanio: 25,
            resaltado: false,
        }
    }

    /// Manija arrastrable de un vértice
    pub fn vertice(indice: usize) -> Self {
        Self {
            contenido: (indice + 1).to_string(),
            color: COLOR_TEMPORAL.to_string(),
            insignia: None,
            fondo_insignia: None,
            tamanio: 16,
            resaltado: false,
        }
    }

    pub fn lugar() -> Self {
        Self {
            contenido: "📍".to_string(),
            color: "#1976d2".to_string(),
            insignia: None,
            fondo_insignia: None,
            tamanio: 30,
            resaltado: false,
        }
    }
}

/// Colores por estado de vendedor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoresEstado {
    pub color: &'static str,
    pub icono: &'static str,
    pub fondo: &'static str,
}

impl ColoresEstado {
    pub fn de(estado: Option<EstadoVendedor>) -> Self {
        match estado {
            Some(EstadoVendedor::Activo) => Self { color: "#10b981", icono: "✓", fondo: "#ecfdf5" },
            Some(EstadoVendedor::Inactivo) => Self { color: "#ef4444", icono: "⏸", fondo: "#fef2f2" },
            Some(EstadoVendedor::Ocupado) => Self { color: "#f59e42", icono: "⏳", fondo: "#fff7ed" },
            None => Self { color: "#6b7280", icono: "👤", fondo: "#f3f4f6" },
        }
    }
}

/// Grupo al que pertenece una capa; el renderizado limpia por grupo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrupoCapa {
    /// Marcadores y figuras de entidades persistidas
    Entidad,
    /// Manijas de edición de vértices
    Vertice,
    /// Vista previa del borrador
    Temporal,
    /// Resultado de una búsqueda de lugar
    Busqueda,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum Figura {
    #[serde(rename_all = "camelCase")]
    Marcador {
        posicion: Punto,
        icono: Icono,
        arrastrable: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        titulo: Option<String>,
    },
    Circulo {
        centro: Punto,
        radio: f64,
        estilo: Estilo,
    },
    Poligono {
        puntos: Vec<Punto>,
        estilo: Estilo,
    },
}

impl Figura {
    pub fn es_marcador(&self) -> bool {
        matches!(self, Figura::Marcador { .. })
    }

    pub fn posicion(&self) -> Punto {
        match self {
            Figura::Marcador { posicion, .. } => *posicion,
            Figura::Circulo { centro, .. } => *centro,
            Figura::Poligono { puntos, .. } => puntos.first().copied().unwrap_or(CENTRO_DEFAULT),
        }
    }

    pub fn estilo(&self) -> Option<&Estilo> {
        match self {
            Figura::Marcador { .. } => None,
            Figura::Circulo { estilo, .. } | Figura::Poligono { estilo, .. } => Some(estilo),
        }
    }

    /// Figura geométrica de una geocerca con su estilo por estado
    pub fn de_geometria(ancla: Punto, geometria: &Geometria, estilo: Estilo) -> Self {
        match geometria {
            Geometria::Circulo { radio } => Figura::Circulo {
                centro: ancla,
                radio: *radio,
                estilo,
            },
            Geometria::Poligono { puntos } => Figura::Poligono {
                puntos: puntos.clone(),
                estilo,
            },
        }
    }
}

/// Capa dibujada en el mapa
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capa {
    pub id: String,
    pub grupo: GrupoCapa,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entidad: Option<String>,
    pub figura: Figura,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<Popup>,
    /// HTML del popup ya renderizado para el front-end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup_html: Option<String>,
}

impl Capa {
    pub fn new(grupo: GrupoCapa, entidad: Option<&str>, figura: Figura) -> Self {
        Self {
            id: String::new(),
            grupo,
            entidad: entidad.map(str::to_string),
            figura,
            popup: None,
            popup_html: None,
        }
    }

    pub fn con_popup(mut self, popup: Popup) -> Self {
        self.popup_html = Some(popup.html());
        self.popup = Some(popup);
        self
    }
}

/// Vista del mapa: centro + zoom, o encuadre de límites con margen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modo", rename_all = "lowercase")]
pub enum VistaMapa {
    Centro { centro: Punto, zoom: u8 },
    Limites { suroeste: Punto, noreste: Punto, margen: f64 },
}

impl Default for VistaMapa {
    fn default() -> Self {
        VistaMapa::Centro {
            centro: CENTRO_DEFAULT,
            zoom: ZOOM_DEFAULT,
        }
    }
}

/// Contenido de un popup. El HTML se genera con un `match` exhaustivo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tipo", content = "datos", rename_all = "lowercase")]
pub enum Popup {
    Geocerca(Geocerca),
    Vendedor(Vendedor),
    Registro(Registro),
    Lugar { nombre: String, direccion: String },
}

/// Escapa texto para insertarlo en HTML
pub fn escapar_html(texto: &str) -> String {
    let mut salida = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => salida.push_str("&amp;"),
            '<' => salida.push_str("&lt;"),
            '>' => salida.push_str("&gt;"),
            '"' => salida.push_str("&quot;"),
            '\'' => salida.push_str("&#39;"),
            otro => salida.push(otro),
        }
    }
    salida
}

fn fila(icono: &str, texto: &str) -> String {
    format!(
        r#"<div class="popup-row"><span class="popup-icon">{}</span><span>{}</span></div>"#,
        icono,
        escapar_html(texto)
    )
}

impl Popup {
    pub fn html(&self) -> String {
        match self {
            Popup::Geocerca(g) => {
                let (etiqueta_medida, medida) = match &g.geometria {
                    Geometria::Circulo { radio } => ("Radio", format!("{}m", radio)),
                    Geometria::Poligono { puntos } => ("Puntos", puntos.len().to_string()),
                };
                let (fondo, texto, estado) = if g.activa {
                    ("#d1fae5", "#065f46", "🟢 Activa")
                } else {
                    ("#fee2e2", "#991b1b", "🔴 Inactiva")
                };
                format!(
                    concat!(
                        r#"<div class="popup-geocerca">"#,
                        r#"<h4 style="color: {color};">{nombre}</h4>"#,
                        r#"<p>{descripcion}</p>"#,
                        r#"<div><strong>Forma:</strong> {forma} <strong>{etiqueta}:</strong> {medida}</div>"#,
                        r#"<div><strong>Tipo:</strong> {tipo} <strong>Zona:</strong> {zona}</div>"#,
                        r#"<span style="background: {fondo}; color: {texto};">{estado}</span>"#,
                        r#"</div>"#
                    ),
                    color = escapar_html(&g.color),
                    nombre = escapar_html(&g.nombre),
                    descripcion = escapar_html(&g.descripcion),
                    forma = g.forma().etiqueta(),
                    etiqueta = etiqueta_medida,
                    medida = medida,
                    tipo = g.tipo.as_str(),
                    zona = escapar_html(&g.zona),
                    fondo = fondo,
                    texto = texto,
                    estado = estado,
                )
            }
            Popup::Vendedor(v) => {
                let colores = ColoresEstado::de(Some(v.estado));
                let mut cuerpo = fila("💼", &format!("Código: {}", v.codigo));
                if let Some(ruc) = &v.ruc {
                    cuerpo.push_str(&fila("🏢", &format!("RUC: {}", ruc)));
                }
                cuerpo.push_str(&fila("📍", v.direccion.as_deref().unwrap_or("Sin dirección")));
                if let Some(ciudad) = &v.ciudad {
                    cuerpo.push_str(&fila("🏢", ciudad));
                }
                if let Some(telefono) = &v.telefono {
                    cuerpo.push_str(&fila("📞", telefono));
                }
                if let Some(zona) = &v.zona {
                    cuerpo.push_str(&fila("📊", &format!("Zona: {}", zona)));
                }
                format!(
                    concat!(
                        r#"<div class="advanced-popup">"#,
                        r#"<div class="popup-header" style="border-color: {color}">"#,
                        r#"<div class="popup-avatar" style="background: {color}">{inicial}</div>"#,
                        r#"<div class="popup-info"><h4>{nombre}</h4>"#,
                        r#"<span class="popup-status" style="background: {fondo}; color: {color}">{icono} {estado}</span>"#,
                        r#"</div></div>"#,
                        r#"<div class="popup-body">{cuerpo}"#,
                        r#"<div class="popup-actions"><button data-accion="actualizar-ubicacion" data-id="{id}">📍 Actualizar Ubicación</button></div>"#,
                        r#"</div></div>"#
                    ),
                    color = colores.color,
                    fondo = colores.fondo,
                    icono = colores.icono,
                    inicial = escapar_html(&v.inicial()),
                    nombre = escapar_html(&v.nombre_completo()),
                    estado = v.estado.as_str().to_uppercase(),
                    cuerpo = cuerpo,
                    id = escapar_html(&v.id),
                )
            }
            Popup::Registro(r) => {
                let horario = match &r.hora_salida {
                    Some(salida) => format!("{} {} - {}", r.fecha, r.hora_ingreso, salida),
                    None => format!("{} {}", r.fecha, r.hora_ingreso),
                };
                let mut detalle = String::new();
                if let Some(cliente) = &r.cliente {
                    detalle.push_str(&format!("<div>Cliente: {}</div>", escapar_html(cliente)));
                }
                if let Some(pedido) = &r.nro_pedido {
                    detalle.push_str(&format!("<div>Pedido: {}</div>", escapar_html(pedido)));
                }
                if let Some(cobro) = &r.nro_cobro {
                    detalle.push_str(&format!("<div>Cobro: {}</div>", escapar_html(cobro)));
                }
                format!(
                    r#"<div class="popup-registro"><strong>{}</strong><br/><small>{}</small><br/>{}<div>Monto: {}</div></div>"#,
                    escapar_html(&r.vendedor),
                    escapar_html(&horario),
                    detalle,
                    r.monto.unwrap_or(0.0)
                )
            }
            Popup::Lugar { nombre, direccion } => format!(
                r#"<div class="popup-lugar"><strong>📍 {}</strong><br><small>{}</small></div>"#,
                escapar_html(nombre),
                escapar_html(direccion)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geocerca::geocercas_semilla;
    use crate::models::registro::registros_semilla;

    #[test]
    fn test_estilo_por_estado() {
        let activa = Estilo::para_geocerca("#3b82f6", true);
        let inactiva = Estilo::para_geocerca("#3b82f6", false);
        assert_eq!((activa.fill_opacity, activa.opacity), (0.2, 1.0));
        assert_eq!((inactiva.fill_opacity, inactiva.opacity), (0.1, 0.5));
        assert_eq!(activa.color, inactiva.color);
    }

    #[test]
    fn test_popup_geocerca_muestra_medida_segun_forma() {
        let semilla = geocercas_semilla();
        let circulo = Popup::Geocerca(semilla[0].clone()).html();
        assert!(circulo.contains("Radio:</strong> 500m"));
        assert!(circulo.contains("🟢 Activa"));

        let poligono = Popup::Geocerca(semilla[2].clone()).html();
        assert!(poligono.contains("Puntos:</strong> 4"));
        assert!(poligono.contains("🔴 Inactiva"));
    }

    #[test]
    fn test_popup_escapa_html() {
        let mut g = geocercas_semilla().remove(0);
        g.nombre = "<script>alert(1)</script>".to_string();
        let html = Popup::Geocerca(g).html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_popup_registro() {
        let html = Popup::Registro(registros_semilla().remove(2)).html();
        assert!(html.contains("2025-07-18 10:10 - 10:40"));
        assert!(html.contains("Pedido: P-2002"));
        assert!(html.contains("Cobro: C-3002"));
        assert!(html.contains("Monto: 300"));
    }

    #[test]
    fn test_vista_desde_texto() {
        assert_eq!("vendedores".parse::<VistaMapaId>().unwrap(), VistaMapaId::Vendedores);
        assert!("clientes".parse::<VistaMapaId>().is_err());
    }
}
