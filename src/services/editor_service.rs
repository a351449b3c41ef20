//! Editor de geocercas
//!
//! Máquina de estados de autoría:
//! `Inactivo → Creando → ColocandoPuntos → ListoParaConfirmar → FormularioAbierto → Inactivo`.
//!
//! El editor trabaja siempre sobre copias: la colección persistida solo cambia
//! cuando el controlador aplica un [`Guardado`] a través del repositorio.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::dto::geocerca_dto::{CambiosFormulario, FormularioGeocerca};
use crate::models::geocerca::{Forma, Geocerca, Punto, MIN_VERTICES_POLIGONO};
use crate::models::mapa::{Capa, Estilo, Figura, GrupoCapa, Icono};
use crate::utils::errors::AppError;
use crate::utils::validation::validate_positive;

pub const RADIO_POR_DEFECTO: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EstadoEditor {
    Inactivo,
    Creando,
    ColocandoPuntos,
    ListoParaConfirmar,
    FormularioAbierto,
}

#[derive(Debug, Error)]
pub enum EditorError {
    /// La acción no aplica en el estado actual (botón deshabilitado)
    #[error("{0}")]
    AccionNoDisponible(String),

    #[error("No existe el vértice #{0}")]
    VerticeInexistente(usize),

    #[error("{0}")]
    Validacion(String),
}

impl From<EditorError> for AppError {
    fn from(e: EditorError) -> Self {
        match e {
            EditorError::AccionNoDisponible(msg) => AppError::Conflict(msg),
            EditorError::VerticeInexistente(_) => AppError::NotFound(e.to_string()),
            EditorError::Validacion(msg) => AppError::Validation(msg),
        }
    }
}

/// Geocerca en creación (borrador)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Borrador {
    pub puntos: Vec<Punto>,
    pub forma: Forma,
    pub radio: f64,
}

impl Default for Borrador {
    fn default() -> Self {
        Self {
            puntos: Vec::new(),
            forma: Forma::Circulo,
            radio: RADIO_POR_DEFECTO,
        }
    }
}

/// Resultado de validar el formulario
#[derive(Debug, Clone, PartialEq)]
pub enum Guardado {
    Crear(Geocerca),
    Actualizar(Geocerca),
}

impl Guardado {
    pub fn geocerca(&self) -> &Geocerca {
        match self {
            Guardado::Crear(g) | Guardado::Actualizar(g) => g,
        }
    }
}

/// Formulario abierto y geocerca en edición al momento de preparar un guardado
#[derive(Debug, Clone, PartialEq)]
pub struct MarcaFormulario {
    formulario: Option<FormularioGeocerca>,
    en_edicion: Option<Geocerca>,
}

/// Qué hizo un clic sobre el mapa
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "resultado", rename_all = "camelCase")]
pub enum ResultadoClick {
    PuntoAgregado { total: usize },
    PuntoSeleccionado { punto: Punto },
}

/// Genera ids `gc-<millis>-<sufijo>` para geocercas nuevas
pub fn generar_id(ahora: DateTime<Utc>) -> String {
    let sufijo = uuid::Uuid::new_v4().simple().to_string();
    format!("gc-{}-{}", ahora.timestamp_millis(), &sufijo[..8])
}

#[derive(Debug, Default)]
pub struct EditorGeocercas {
    modo_creacion: bool,
    borrador: Borrador,
    formulario: Option<FormularioGeocerca>,
    /// Copia de la geocerca persistida que se está editando
    en_edicion: Option<Geocerca>,
    punto_seleccionado: Option<Punto>,
}

impl EditorGeocercas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estado(&self) -> EstadoEditor {
        if self.formulario.is_some() {
            EstadoEditor::FormularioAbierto
        } else if !self.modo_creacion {
            EstadoEditor::Inactivo
        } else if self.borrador.puntos.is_empty() {
            EstadoEditor::Creando
        } else if self.puede_confirmar() {
            EstadoEditor::ListoParaConfirmar
        } else {
            EstadoEditor::ColocandoPuntos
        }
    }

    pub fn modo_creacion(&self) -> bool {
        self.modo_creacion
    }

    pub fn borrador(&self) -> &Borrador {
        &self.borrador
    }

    pub fn formulario(&self) -> Option<&FormularioGeocerca> {
        self.formulario.as_ref()
    }

    pub fn en_edicion(&self) -> Option<&Geocerca> {
        self.en_edicion.as_ref()
    }

    pub fn punto_seleccionado(&self) -> Option<Punto> {
        self.punto_seleccionado
    }

    /// Activa o desactiva el modo creación. Devuelve el nuevo valor.
    pub fn alternar_modo_creacion(&mut self) -> bool {
        self.modo_creacion = !self.modo_creacion;
        self.cerrar_formulario();

        if self.modo_creacion {
            self.borrador.puntos.clear();
        } else {
            self.borrador = Borrador::default();
            self.punto_seleccionado = None;
        }

        tracing::debug!(
            "✏️ Modo creación {}",
            if self.modo_creacion { "activo" } else { "desactivado" }
        );
        self.modo_creacion
    }

    pub fn cambiar_forma(&mut self, forma: Forma) {
        self.borrador.forma = forma;
        self.borrador.puntos.clear();
    }

    pub fn fijar_radio(&mut self, radio: f64) -> Result<(), EditorError> {
        if !radio.is_finite() || validate_positive(radio).is_err() {
            return Err(EditorError::Validacion(
                "El radio debe ser mayor que cero".to_string(),
            ));
        }
        self.borrador.radio = radio;
        Ok(())
    }

    pub fn click_mapa(&mut self, punto: Punto) -> ResultadoClick {
        if !self.modo_creacion {
            self.punto_seleccionado = Some(punto);
            return ResultadoClick::PuntoSeleccionado { punto };
        }

        // un círculo se define con un único punto
        if self.borrador.forma == Forma::Circulo {
            self.borrador.puntos.clear();
        }
        self.borrador.puntos.push(punto);
        ResultadoClick::PuntoAgregado {
            total: self.borrador.puntos.len(),
        }
    }

    /// Abre un formulario de círculo anclado en el punto seleccionado
    pub fn crear_en_punto_seleccionado(&mut self) -> Result<(), EditorError> {
        let punto = self.punto_seleccionado.take().ok_or_else(|| {
            EditorError::AccionNoDisponible("No hay un punto seleccionado en el mapa".to_string())
        })?;

        self.en_edicion = None;
        self.formulario = Some(FormularioGeocerca {
            latitud: Some(punto.lat),
            longitud: Some(punto.lng),
            ..FormularioGeocerca::default()
        });
        Ok(())
    }

    /// Vértices que se pueden arrastrar ahora mismo
    fn vertices_editables(&mut self) -> Result<&mut Vec<Punto>, EditorError> {
        if self.modo_creacion {
            return Ok(&mut self.borrador.puntos);
        }
        if self.en_edicion_poligono() {
            if let Some(puntos) = self.formulario.as_mut().and_then(|f| f.puntos.as_mut()) {
                return Ok(puntos);
            }
        }
        Err(EditorError::AccionNoDisponible(
            "No hay vértices en edición".to_string(),
        ))
    }

    fn en_edicion_poligono(&self) -> bool {
        matches!(&self.en_edicion, Some(g) if g.forma() == Forma::Poligono)
            && matches!(&self.formulario, Some(f) if f.forma == Forma::Poligono)
    }

    /// Arrastre de un vértice: actualiza sus coordenadas en vivo
    pub fn mover_vertice(&mut self, indice: usize, punto: Punto) -> Result<(), EditorError> {
        if self.modo_creacion && self.borrador.forma != Forma::Poligono {
            return Err(EditorError::AccionNoDisponible(
                "Solo los vértices de un polígono se pueden arrastrar".to_string(),
            ));
        }
        let vertices = self.vertices_editables()?;
        let vertice = vertices
            .get_mut(indice)
            .ok_or(EditorError::VerticeInexistente(indice))?;
        *vertice = punto;
        Ok(())
    }

    /// Doble clic sobre un vértice: lo elimina y los demás se reindexan
    pub fn eliminar_vertice(&mut self, indice: usize) -> Result<Punto, EditorError> {
        let vertices = self.vertices_editables()?;
        if indice >= vertices.len() {
            return Err(EditorError::VerticeInexistente(indice));
        }
        Ok(vertices.remove(indice))
    }

    pub fn puede_confirmar(&self) -> bool {
        match self.borrador.forma {
            Forma::Circulo => self.borrador.puntos.len() == 1,
            Forma::Poligono => self.borrador.puntos.len() >= MIN_VERTICES_POLIGONO,
        }
    }

    /// Copia el borrador al formulario y lo abre
    pub fn confirmar(&mut self) -> Result<(), EditorError> {
        if !self.modo_creacion || !self.puede_confirmar() {
            return Err(EditorError::AccionNoDisponible(
                "La geocerca en creación no está lista para confirmar".to_string(),
            ));
        }

        let borrador = std::mem::take(&mut self.borrador);
        let ancla = borrador.puntos[0];
        let mut formulario = FormularioGeocerca {
            latitud: Some(ancla.lat),
            longitud: Some(ancla.lng),
            forma: borrador.forma,
            ..FormularioGeocerca::default()
        };
        match borrador.forma {
            Forma::Circulo => {
                formulario.radio = Some(borrador.radio);
                formulario.puntos = None;
            }
            Forma::Poligono => {
                formulario.radio = None;
                formulario.puntos = Some(borrador.puntos);
            }
        }

        self.en_edicion = None;
        self.formulario = Some(formulario);
        self.modo_creacion = false;
        Ok(())
    }

    /// Abre el formulario con una copia de la geocerca persistida
    pub fn editar(&mut self, geocerca: &Geocerca) {
        self.formulario = Some(FormularioGeocerca::from(geocerca));
        self.en_edicion = Some(geocerca.clone());
        self.modo_creacion = false;
        self.borrador = Borrador::default();
    }

    pub fn actualizar_formulario(&mut self, cambios: CambiosFormulario) -> Result<(), EditorError> {
        let formulario = self.formulario.as_mut().ok_or_else(|| {
            EditorError::AccionNoDisponible("No hay un formulario abierto".to_string())
        })?;
        formulario.aplicar(cambios);
        Ok(())
    }

    /// Valida el formulario y decide si se crea o se actualiza. No cambia el estado.
    pub fn preparar_guardado(&self, ahora: DateTime<Utc>) -> Result<Guardado, AppError> {
        let formulario = self.formulario.as_ref().ok_or_else(|| {
            AppError::Conflict("No hay un formulario abierto".to_string())
        })?;

        match &self.en_edicion {
            Some(original) => {
                let geocerca = formulario.a_geocerca(original.id.clone(), original.fecha_creacion)?;
                Ok(Guardado::Actualizar(geocerca))
            }
            None => {
                let geocerca = formulario.a_geocerca(generar_id(ahora), ahora)?;
                Ok(Guardado::Crear(geocerca))
            }
        }
    }

    /// Cierra el formulario tras un guardado exitoso
    pub fn cerrar_formulario(&mut self) {
        self.formulario = None;
        self.en_edicion = None;
    }

    pub fn marca_formulario(&self) -> MarcaFormulario {
        MarcaFormulario {
            formulario: self.formulario.clone(),
            en_edicion: self.en_edicion.clone(),
        }
    }

    /// Cierra el formulario solo si sigue siendo el marcado. Un formulario
    /// abierto después (otra edición, otra confirmación) se respeta.
    pub fn cerrar_formulario_si(&mut self, marca: &MarcaFormulario) -> bool {
        if self.marca_formulario() != *marca {
            return false;
        }
        self.cerrar_formulario();
        true
    }

    /// Descarta el formulario; la geometría vuelve a la última guardada
    pub fn cancelar(&mut self) {
        if let Some(g) = &self.en_edicion {
            tracing::debug!("↩️ Edición de '{}' descartada", g.id);
        }
        self.cerrar_formulario();
    }

    /// Si la geocerca `id` está en edición de vértices, sus vértices en vivo
    pub fn vertices_en_edicion(&self) -> Option<(&str, &[Punto])> {
        if !self.en_edicion_poligono() {
            return None;
        }
        let id = self.en_edicion.as_ref()?.id.as_str();
        let puntos = self.formulario.as_ref()?.puntos.as_deref()?;
        Some((id, puntos))
    }

    /// Capas temporales del borrador: una por vértice más la figura discontinua
    pub fn vista_previa(&self) -> Vec<Capa> {
        if !self.modo_creacion {
            return Vec::new();
        }

        let puntos = &self.borrador.puntos;
        let mut capas: Vec<Capa> = puntos
            .iter()
            .enumerate()
            .map(|(indice, punto)| {
                let figura = match self.borrador.forma {
                    Forma::Circulo => Figura::Marcador {
                        posicion: *punto,
                        icono: Icono::numerado(indice + 1),
                        arrastrable: false,
                        titulo: None,
                    },
                    Forma::Poligono => Figura::Marcador {
                        posicion: *punto,
                        icono: Icono::vertice(indice),
                        arrastrable: true,
                        titulo: Some(format!("Vértice {}", indice + 1)),
                    },
                };
                Capa::new(GrupoCapa::Temporal, None, figura)
            })
            .collect();

        match self.borrador.forma {
            Forma::Circulo if puntos.len() == 1 => capas.push(Capa::new(
                GrupoCapa::Temporal,
                None,
                Figura::Circulo {
                    centro: puntos[0],
                    radio: self.borrador.radio,
                    estilo: Estilo::temporal(),
                },
            )),
            Forma::Poligono if puntos.len() >= 2 => capas.push(Capa::new(
                GrupoCapa::Temporal,
                None,
                Figura::Poligono {
                    puntos: puntos.clone(),
                    estilo: Estilo::temporal(),
                },
            )),
            _ => {}
        }

        capas
    }

    /// Texto de ayuda para el usuario según el estado
    pub fn instruccion(&self) -> Option<String> {
        if !self.modo_creacion {
            return None;
        }
        let total = self.borrador.puntos.len();
        let texto = match self.borrador.forma {
            Forma::Circulo if total == 0 => {
                "Haz clic en el mapa para colocar el centro del círculo".to_string()
            }
            Forma::Circulo => "Ajusta el radio y confirma la creación".to_string(),
            Forma::Poligono if total == 0 => {
                "Haz clic en el mapa para agregar puntos del polígono".to_string()
            }
            Forma::Poligono if total < MIN_VERTICES_POLIGONO => {
                format!("{}/3 puntos mínimos requeridos", total)
            }
            Forma::Poligono => "Doble clic para cerrar o continúa agregando puntos".to_string(),
        };
        Some(texto)
    }
}
