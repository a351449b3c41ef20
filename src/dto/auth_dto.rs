use serde::{Deserialize, Serialize};

use crate::models::auth::{Empresa, SesionInfo};

// Selección de empresa tras el login
#[derive(Debug, Deserialize)]
pub struct SeleccionarEmpresaRequest {
    pub id: i64,
}

// Respuesta de login: la sesión aún no tiene empresa
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResultado {
    pub username: String,
    pub empresas: Vec<Empresa>,
    pub requiere_empresa: bool,
}

// Estado de la sesión para el guard del front-end
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadoSesion {
    pub autenticado: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sesion: Option<SesionInfo>,
}
