use serde::{Deserialize, Serialize};

use crate::models::mapa::{Capa, VistaMapa, VistaMapaId};
use crate::services::eventos::AccionMapa;
use crate::services::mapa_service::{EstadoMapa, RenderizadorMapa};

/// Dimensiones del contenedor que informa el front-end
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContenedorRequest {
    pub ancho: u32,
    pub alto: u32,
}

/// Centrar en una entidad ya dibujada; sin id vuelve al centro por defecto
#[derive(Debug, Default, Deserialize)]
pub struct CentrarRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// Clic en un botón de popup (`data-accion` + `data-id`)
#[derive(Debug, Deserialize)]
pub struct AccionRequest {
    pub vista: VistaMapaId,
    #[serde(flatten)]
    pub accion: AccionMapa,
}

/// Capas y vista actuales de un mapa
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapaSnapshot {
    pub estado: EstadoMapa,
    pub vista: VistaMapa,
    pub capas: Vec<Capa>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup_abierto: Option<String>,
}

impl From<&RenderizadorMapa> for MapaSnapshot {
    fn from(mapa: &RenderizadorMapa) -> Self {
        let superficie = mapa.superficie();
        Self {
            estado: mapa.estado().clone(),
            vista: superficie.vista().clone(),
            capas: superficie.capas().to_vec(),
            popup_abierto: superficie.popup_abierto().map(str::to_string),
        }
    }
}
