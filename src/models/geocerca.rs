//! Modelo de Geocerca
//!
//! La geometría se guarda como enum: un círculo nunca tiene vértices y un
//! polígono nunca tiene radio. En disco y en el API se usa el registro plano
//! (`forma` + `radio?` + `puntos?`) con nombres camelCase.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mínimo de vértices de un polígono persistible
pub const MIN_VERTICES_POLIGONO: usize = 3;

/// Vértice (lat, lng)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Punto {
    pub lat: f64,
    pub lng: f64,
}

impl Punto {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Forma {
    #[default]
    Circulo,
    Poligono,
}

impl Forma {
    pub fn icono(&self) -> &'static str {
        match self {
            Forma::Circulo => "⭕",
            Forma::Poligono => "🔷",
        }
    }

    pub fn etiqueta(&self) -> &'static str {
        match self {
            Forma::Circulo => "Círculo",
            Forma::Poligono => "Polígono",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Forma::Circulo => "circulo",
            Forma::Poligono => "poligono",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoGeocerca {
    #[default]
    Comercial,
    Residencial,
    Industrial,
    Publica,
    Especial,
}

impl TipoGeocerca {
    pub fn icono(&self) -> &'static str {
        match self {
            TipoGeocerca::Comercial => "🏪",
            TipoGeocerca::Residencial => "🏠",
            TipoGeocerca::Industrial => "🏭",
            TipoGeocerca::Publica => "🏛️",
            TipoGeocerca::Especial => "⭐",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoGeocerca::Comercial => "comercial",
            TipoGeocerca::Residencial => "residencial",
            TipoGeocerca::Industrial => "industrial",
            TipoGeocerca::Publica => "publica",
            TipoGeocerca::Especial => "especial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prioridad {
    Alta,
    #[default]
    Media,
    Baja,
}

/// Geometría discriminada por forma
#[derive(Debug, Clone, PartialEq)]
pub enum Geometria {
    Circulo { radio: f64 },
    Poligono { puntos: Vec<Punto> },
}

impl Geometria {
    pub fn forma(&self) -> Forma {
        match self {
            Geometria::Circulo { .. } => Forma::Circulo,
            Geometria::Poligono { .. } => Forma::Poligono,
        }
    }

    pub fn vertices(&self) -> &[Punto] {
        match self {
            Geometria::Circulo { .. } => &[],
            Geometria::Poligono { puntos } => puntos,
        }
    }

    pub fn radio(&self) -> Option<f64> {
        match self {
            Geometria::Circulo { radio } => Some(*radio),
            Geometria::Poligono { .. } => None,
        }
    }

    /// Construye la geometría verificando sus invariantes
    pub fn validar(forma: Forma, radio: Option<f64>, puntos: Option<Vec<Punto>>) -> Result<Self, GeometriaInvalida> {
        match forma {
            Forma::Circulo => match radio {
                Some(r) if r.is_finite() && r > 0.0 => Ok(Geometria::Circulo { radio: r }),
                _ => Err(GeometriaInvalida::RadioInvalido),
            },
            Forma::Poligono => {
                let puntos = puntos.unwrap_or_default();
                if puntos.len() < MIN_VERTICES_POLIGONO {
                    return Err(GeometriaInvalida::VerticesInsuficientes(puntos.len()));
                }
                Ok(Geometria::Poligono { puntos })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometriaInvalida {
    #[error("un círculo necesita un radio mayor que cero")]
    RadioInvalido,
    #[error("un polígono necesita al menos 3 puntos, tiene {0}")]
    VerticesInsuficientes(usize),
}

/// Geocerca persistida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeocercaRegistro", into = "GeocercaRegistro")]
pub struct Geocerca {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    pub zona: String,
    pub tipo: TipoGeocerca,
    pub prioridad: Prioridad,
    pub alertas: bool,
    pub activa: bool,
    pub color: String,
    pub fecha_creacion: DateTime<Utc>,
    /// Ancla: centro del círculo o primer vértice del polígono
    pub latitud: f64,
    pub longitud: f64,
    pub geometria: Geometria,
}

impl Geocerca {
    pub fn forma(&self) -> Forma {
        self.geometria.forma()
    }

    pub fn ancla(&self) -> Punto {
        Punto::new(self.latitud, self.longitud)
    }
}

fn color_por_defecto() -> String {
    "#3b82f6".to_string()
}

/// Fecha fija para registros antiguos sin `fechaCreacion`
fn fecha_desconocida() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn verdadero() -> bool {
    true
}

/// Forma plana de almacenamiento. Acepta registros antiguos sin `forma`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocercaRegistro {
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub zona: String,
    #[serde(default)]
    pub tipo: TipoGeocerca,
    #[serde(default)]
    pub prioridad: Prioridad,
    #[serde(default)]
    pub alertas: bool,
    #[serde(default = "verdadero")]
    pub activa: bool,
    #[serde(default = "color_por_defecto")]
    pub color: String,
    #[serde(default = "fecha_desconocida")]
    pub fecha_creacion: DateTime<Utc>,
    pub latitud: f64,
    pub longitud: f64,
    #[serde(default)]
    pub forma: Forma,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puntos: Option<Vec<Punto>>,
}

impl TryFrom<GeocercaRegistro> for Geocerca {
    type Error = GeometriaInvalida;

    fn try_from(r: GeocercaRegistro) -> Result<Self, Self::Error> {
        let geometria = Geometria::validar(r.forma, r.radio, r.puntos)?;
        Ok(Self {
            id: r.id,
            nombre: r.nombre,
            descripcion: r.descripcion,
            zona: r.zona,
            tipo: r.tipo,
            prioridad: r.prioridad,
            alertas: r.alertas,
            activa: r.activa,
            color: r.color,
            fecha_creacion: r.fecha_creacion,
            latitud: r.latitud,
            longitud: r.longitud,
            geometria,
        })
    }
}

impl From<Geocerca> for GeocercaRegistro {
    fn from(g: Geocerca) -> Self {
        let forma = g.forma();
        let (radio, puntos) = match g.geometria {
            Geometria::Circulo { radio } => (Some(radio), None),
            Geometria::Poligono { puntos } => (None, Some(puntos)),
        };
        Self {
            id: g.id,
            nombre: g.nombre,
            descripcion: g.descripcion,
            zona: g.zona,
            tipo: g.tipo,
            prioridad: g.prioridad,
            alertas: g.alertas,
            activa: g.activa,
            color: g.color,
            fecha_creacion: g.fecha_creacion,
            latitud: g.latitud,
            longitud: g.longitud,
            forma,
            radio,
            puntos,
        }
    }
}

fn fecha(anio: i32, mes: u32, dia: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(anio, mes, dia, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Datos de ejemplo con los que arranca una colección vacía
pub fn geocercas_semilla() -> Vec<Geocerca> {
    vec![
        Geocerca {
            id: "gc-001".to_string(),
            nombre: "Centro Comercial Plaza Norte".to_string(),
            descripcion: "Principal centro comercial de la zona norte".to_string(),
            zona: "norte".to_string(),
            tipo: TipoGeocerca::Comercial,
            prioridad: Prioridad::Alta,
            alertas: true,
            activa: true,
            color: "#3b82f6".to_string(),
            fecha_creacion: fecha(2024, 1, 15),
            latitud: -0.1868,
            longitud: -78.5107,
            geometria: Geometria::Circulo { radio: 500.0 },
        },
        Geocerca {
            id: "gc-002".to_string(),
            nombre: "Zona Residencial Las Flores".to_string(),
            descripcion: "Área residencial exclusiva".to_string(),
            zona: "oeste".to_string(),
            tipo: TipoGeocerca::Residencial,
            prioridad: Prioridad::Media,
            alertas: false,
            activa: true,
            color: "#10b981".to_string(),
            fecha_creacion: fecha(2024, 2, 1),
            latitud: -0.1732,
            longitud: -78.4891,
            geometria: Geometria::Circulo { radio: 800.0 },
        },
        Geocerca {
            id: "gc-003".to_string(),
            nombre: "Polígono Industrial Norte".to_string(),
            descripcion: "Zona industrial principal con forma irregular".to_string(),
            zona: "este".to_string(),
            tipo: TipoGeocerca::Industrial,
            prioridad: Prioridad::Baja,
            alertas: false,
            activa: false,
            color: "#f59e0b".to_string(),
            fecha_creacion: fecha(2024, 1, 20),
            latitud: -0.1567,
            longitud: -78.5488,
            geometria: Geometria::Poligono {
                puntos: vec![
                    Punto::new(-0.1550, -78.5470),
                    Punto::new(-0.1580, -78.5430),
                    Punto::new(-0.1590, -78.5510),
                    Punto::new(-0.1560, -78.5520),
                ],
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registro_antiguo_sin_forma_es_circulo() {
        let legado = json!({
            "id": "gc-legacy",
            "nombre": "Mercado Central",
            "latitud": -0.22,
            "longitud": -78.51,
            "radio": 250,
            "color": "#ef4444",
            "activa": true
        });

        let geocerca: Geocerca = serde_json::from_value(legado.clone()).unwrap();
        assert_eq!(geocerca.forma(), Forma::Circulo);
        assert_eq!(geocerca.geometria, Geometria::Circulo { radio: 250.0 });

        // la fecha de respaldo no cambia entre cargas
        let otra_carga: Geocerca = serde_json::from_value(legado).unwrap();
        assert_eq!(geocerca.fecha_creacion, otra_carga.fecha_creacion);
        assert_eq!(geocerca.fecha_creacion, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_circulo_se_serializa_sin_puntos() {
        let circulo = geocercas_semilla().remove(0);
        let valor = serde_json::to_value(&circulo).unwrap();
        assert_eq!(valor["forma"], "circulo");
        assert_eq!(valor["radio"], 500.0);
        assert!(valor.get("puntos").is_none());
        assert!(valor.get("fechaCreacion").is_some());
    }

    #[test]
    fn test_poligono_se_serializa_sin_radio() {
        let poligono = geocercas_semilla().remove(2);
        let valor = serde_json::to_value(&poligono).unwrap();
        assert_eq!(valor["forma"], "poligono");
        assert_eq!(valor["puntos"].as_array().unwrap().len(), 4);
        assert!(valor.get("radio").is_none());
    }

    #[test]
    fn test_geometria_invalida_se_rechaza() {
        let sin_vertices = json!({
            "id": "gc-x", "nombre": "x", "latitud": 0.0, "longitud": 0.0,
            "forma": "poligono", "puntos": [{"lat": 0.0, "lng": 0.0}]
        });
        assert!(serde_json::from_value::<Geocerca>(sin_vertices).is_err());

        assert_eq!(
            Geometria::validar(Forma::Circulo, Some(0.0), None),
            Err(GeometriaInvalida::RadioInvalido)
        );
        assert_eq!(
            Geometria::validar(Forma::Poligono, None, None),
            Err(GeometriaInvalida::VerticesInsuficientes(0))
        );
    }

    #[test]
    fn test_iconos() {
        assert_eq!(TipoGeocerca::Publica.icono(), "🏛️");
        assert_eq!(Forma::Poligono.icono(), "🔷");
    }
}
