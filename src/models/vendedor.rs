//! Modelo de Vendedor
//!
//! `VendedorApi` es la forma que devuelve el API remoto; `Vendedor` es la
//! forma normalizada que usan los listados y el mapa.

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::geocerca::Punto;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoVendedor {
    Activo,
    Inactivo,
    Ocupado,
}

impl EstadoVendedor {
    /// Estado numérico del API: 1 = activo, cualquier otro = inactivo
    pub fn desde_codigo(codigo: i32) -> Self {
        match codigo {
            1 => EstadoVendedor::Activo,
            _ => EstadoVendedor::Inactivo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoVendedor::Activo => "activo",
            EstadoVendedor::Inactivo => "inactivo",
            EstadoVendedor::Ocupado => "ocupado",
        }
    }
}

/// Vendedor tal como lo devuelve `GET /Vendedor/todos`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendedorApi {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub ruc: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono1: Option<String>,
    #[serde(default)]
    pub telefono2: Option<String>,
    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default)]
    pub zona: Option<String>,
    #[serde(default)]
    pub representante: Option<String>,
    #[serde(default)]
    pub estado: i32,
    #[serde(default)]
    pub comision: Option<f64>,
    #[serde(default)]
    pub fecha_registro: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginacion {
    pub pagina_actual: u32,
    pub tamanio_pagina: u32,
    pub total_registros: u32,
    pub total_paginas: u32,
    pub tiene_pagina_anterior: bool,
    pub tiene_pagina_siguiente: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendedoresResponse {
    pub vendedores: Vec<VendedorApi>,
    pub paginacion: Paginacion,
    #[serde(default)]
    pub fecha_consulta: Option<String>,
    #[serde(default)]
    pub id_empresa: Option<i64>,
}

/// Parámetros de `GET /Vendedor/todos`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendedorRequest {
    pub id_empresa: i64,
    pub pagina: u32,
    pub tamanio_pagina: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termino: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<i32>,
}

/// Vendedor normalizado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendedor {
    pub id: String,
    pub codigo: String,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellidos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distrito: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representante: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub estado: EstadoVendedor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_registro: Option<DateTime<Utc>>,
    /// Métricas simuladas hasta que el API las exponga
    #[serde(default)]
    pub ventas_hoy: u32,
    #[serde(default)]
    pub clientes_visitados: u32,
}

/// Coordenadas por ciudad; el API no entrega GPS por vendedor
const COORDENADAS_CIUDADES: &[(&str, f64, f64)] = &[
    ("QUITO", -0.1807, -78.4678),
    ("GUAYAQUIL", -2.1894, -79.8890),
    ("CUENCA", -2.9005, -79.0059),
    ("AMBATO", -1.2543, -78.6267),
    ("MACHALA", -3.2581, -79.9553),
    ("MANTA", -0.9677, -80.7088),
];

const COORDENADAS_DEFAULT: (f64, f64) = (-0.1807, -78.4678);

/// Desplazamiento máximo total (±0.005°) para que los marcadores no se encimen
const AMPLITUD_JITTER: f64 = 0.01;

pub fn coordenadas_ciudad(ciudad: Option<&str>) -> Punto {
    let clave = ciudad.unwrap_or_default().trim().to_uppercase();
    let (lat, lng) = COORDENADAS_CIUDADES
        .iter()
        .find(|(nombre, _, _)| *nombre == clave)
        .map(|(_, lat, lng)| (*lat, *lng))
        .unwrap_or(COORDENADAS_DEFAULT);
    Punto::new(lat, lng)
}

fn no_vacio(valor: Option<String>) -> Option<String> {
    valor.filter(|v| !v.trim().is_empty())
}

fn parsear_fecha(valor: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(valor)
        .map(|f| f.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(valor, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|f| f.and_utc())
        })
}

impl Vendedor {
    /// Adapta un registro del API a la forma normalizada
    pub fn desde_api<R: Rng + ?Sized>(api: VendedorApi, rng: &mut R) -> Self {
        let nombre_completo = api.nombre.trim();
        let mut partes = nombre_completo.split_whitespace();
        let nombre = partes.next().unwrap_or_default().to_string();
        let apellidos = partes.collect::<Vec<_>>().join(" ");

        let base = coordenadas_ciudad(api.ciudad.as_deref());
        let lat = base.lat + (rng.gen::<f64>() - 0.5) * AMPLITUD_JITTER;
        let lng = base.lng + (rng.gen::<f64>() - 0.5) * AMPLITUD_JITTER;

        let ciudad = no_vacio(api.ciudad);
        let zona = no_vacio(api.zona);

        Self {
            id: api.codigo.clone(),
            codigo: api.codigo,
            nombre,
            apellidos: Some(apellidos).filter(|a| !a.is_empty()),
            telefono: no_vacio(api.telefono1),
            telefono2: no_vacio(api.telefono2),
            direccion: no_vacio(api.direccion),
            distrito: ciudad.clone().or_else(|| zona.clone()),
            ruc: api.ruc,
            zona,
            ciudad,
            representante: no_vacio(api.representante),
            lat,
            lng,
            estado: EstadoVendedor::desde_codigo(api.estado),
            comision: api.comision,
            fecha_registro: api.fecha_registro.as_deref().and_then(parsear_fecha),
            ventas_hoy: rng.gen_range(0..15),
            clientes_visitados: rng.gen_range(0..20),
        }
    }

    pub fn nombre_completo(&self) -> String {
        match &self.apellidos {
            Some(apellidos) => format!("{} {}", self.nombre, apellidos),
            None => self.nombre.clone(),
        }
    }

    pub fn inicial(&self) -> String {
        self.nombre
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default()
    }

    pub fn posicion(&self) -> Punto {
        Punto::new(self.lat, self.lng)
    }
}
