use serde::{Deserialize, Serialize};

use crate::services::geocoding_service::Lugar;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuscarLugarQuery {
    #[serde(default)]
    pub q: String,
}

/// Navegar a un resultado de búsqueda
#[derive(Debug, Clone, Deserialize)]
pub struct IrALugarRequest {
    pub lat: f64,
    pub lng: f64,
    pub nombre: String,
    #[serde(default)]
    pub direccion: String,
}

/// Resultado de una búsqueda con debounce
#[derive(Debug, Serialize)]
#[serde(tag = "estado", rename_all = "camelCase")]
pub enum ResultadoBusqueda {
    Ejecutada { lugares: Vec<Lugar> },
    /// Otra búsqueda llegó durante el periodo de silencio
    Reemplazada,
    SinCambios,
}
