use serde::{Deserialize, Serialize};

use crate::models::vendedor::{Paginacion, Vendedor};
use crate::services::filtro_service::EstadisticasVendedores;

/// Carga de una página (`POST /api/vendedores/cargar`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargarVendedoresRequest {
    #[serde(default)]
    pub pagina: Option<u32>,
    #[serde(default)]
    pub termino: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

/// Filtros locales del listado (`GET /api/vendedores?q=&estado=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendedorQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

/// Posición del dispositivo; sin coordenadas no hay geolocalización
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UbicacionRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendedoresListResponse {
    pub vendedores: Vec<Vendedor>,
    pub paginacion: Option<Paginacion>,
    pub cargando: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub estadisticas: EstadisticasVendedores,
}

/// Cuerpo que se enviaría al servidor al actualizar la ubicación
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizacionUbicacion {
    pub vendedor_id: String,
    pub coordenadas: Coordenadas,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordenadas {
    pub latitud: f64,
    pub longitud: f64,
    pub precision: Option<f64>,
    pub fecha_actualizacion: String,
}
