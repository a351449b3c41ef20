use serde::{Deserialize, Serialize};

use crate::dto::geocerca_dto::FormularioGeocerca;
use crate::models::geocerca::{Forma, Punto};
use crate::models::mapa::Capa;
use crate::services::editor_service::{Borrador, EditorGeocercas, EstadoEditor};

/// Foto del editor que consume el front-end después de cada acción
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub estado: EstadoEditor,
    pub modo_creacion: bool,
    pub borrador: Borrador,
    pub puede_confirmar: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formulario: Option<FormularioGeocerca>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_edicion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punto_seleccionado: Option<Punto>,
    pub vista_previa: Vec<Capa>,
}

impl From<&EditorGeocercas> for EditorSnapshot {
    fn from(editor: &EditorGeocercas) -> Self {
        Self {
            estado: editor.estado(),
            modo_creacion: editor.modo_creacion(),
            borrador: editor.borrador().clone(),
            puede_confirmar: editor.puede_confirmar(),
            instruccion: editor.instruccion(),
            formulario: editor.formulario().cloned(),
            en_edicion: editor.en_edicion().map(|g| g.id.clone()),
            punto_seleccionado: editor.punto_seleccionado(),
            vista_previa: editor.vista_previa(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FormaRequest {
    pub forma: Forma,
}

#[derive(Debug, Deserialize)]
pub struct RadioRequest {
    pub radio: f64,
}

/// Clic, arrastre o doble clic sobre el mapa
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PuntoRequest {
    pub lat: f64,
    pub lng: f64,
}

impl From<PuntoRequest> for Punto {
    fn from(p: PuntoRequest) -> Self {
        Punto::new(p.lat, p.lng)
    }
}
