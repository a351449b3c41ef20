use serde::{Deserialize, Serialize};

use crate::models::registro::Registro;

/// Filtros del detalle de registros (`GET /api/registros`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistroQuery {
    #[serde(default)]
    pub vendedor: Option<String>,
    #[serde(default)]
    pub cliente: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub desde: Option<String>,
    #[serde(default)]
    pub hasta: Option<String>,
    #[serde(default)]
    pub mostrar_pedidos: Option<bool>,
    #[serde(default)]
    pub mostrar_cobros: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrosListResponse {
    pub registros: Vec<Registro>,
    pub total: usize,
    pub filtrados: usize,
    pub desde: String,
    pub hasta: String,
}

/// Resumen del tablero principal
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub empresa: String,
    pub usuario: String,
    pub iniciales: String,
    pub token_preview: String,
    pub geocercas_activas: usize,
    pub vendedores: usize,
    pub registros_hoy: usize,
}
