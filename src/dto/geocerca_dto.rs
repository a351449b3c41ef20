use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::geocerca::{
    Forma, Geocerca, Geometria, Prioridad, Punto, TipoGeocerca, MIN_VERTICES_POLIGONO,
};
use crate::models::mapa::CENTRO_DEFAULT;
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::{validate_color, validate_not_empty};

pub const MSG_CAMPOS_OBLIGATORIOS: &str = "Por favor completa todos los campos obligatorios";
pub const MSG_RADIO_REQUERIDO: &str = "Por favor especifica el radio para el círculo";
pub const MSG_VERTICES_INSUFICIENTES: &str = "Los polígonos necesitan al menos 3 puntos";

/// Formulario de alta/edición de geocercas.
///
/// Puede tener a la vez `radio` y `puntos` mientras se edita; al guardar solo
/// se conserva lo que corresponde a `forma`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormularioGeocerca {
    #[validate(length(max = 120, message = "El nombre es demasiado largo"))]
    pub nombre: String,
    #[validate(length(max = 500, message = "La descripción es demasiado larga"))]
    #[serde(default)]
    pub descripcion: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitud fuera de rango"))]
    pub latitud: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitud fuera de rango"))]
    pub longitud: Option<f64>,
    #[serde(default)]
    pub radio: Option<f64>,
    #[serde(default)]
    pub puntos: Option<Vec<Punto>>,
    #[validate(custom = "validate_color")]
    pub color: String,
    #[serde(default)]
    pub tipo: TipoGeocerca,
    #[serde(default)]
    pub forma: Forma,
    #[serde(default = "activa_por_defecto")]
    pub activa: bool,
    #[serde(default)]
    pub zona: String,
    #[serde(default)]
    pub prioridad: Prioridad,
    #[serde(default)]
    pub alertas: bool,
}

fn activa_por_defecto() -> bool {
    true
}

impl Default for FormularioGeocerca {
    fn default() -> Self {
        Self {
            nombre: String::new(),
            descripcion: String::new(),
            latitud: Some(CENTRO_DEFAULT.lat),
            longitud: Some(CENTRO_DEFAULT.lng),
            radio: Some(300.0),
            puntos: None,
            color: "#3b82f6".to_string(),
            tipo: TipoGeocerca::Comercial,
            forma: Forma::Circulo,
            activa: true,
            zona: "centro".to_string(),
            prioridad: Prioridad::Media,
            alertas: true,
        }
    }
}

impl From<&Geocerca> for FormularioGeocerca {
    fn from(g: &Geocerca) -> Self {
        Self {
            nombre: g.nombre.clone(),
            descripcion: g.descripcion.clone(),
            latitud: Some(g.latitud),
            longitud: Some(g.longitud),
            radio: g.geometria.radio(),
            puntos: match &g.geometria {
                Geometria::Poligono { puntos } => Some(puntos.clone()),
                Geometria::Circulo { .. } => None,
            },
            color: g.color.clone(),
            tipo: g.tipo,
            forma: g.forma(),
            activa: g.activa,
            zona: g.zona.clone(),
            prioridad: g.prioridad,
            alertas: g.alertas,
        }
    }
}

impl FormularioGeocerca {
    /// Reglas de guardado. No modifica nada; devuelve la geometría final.
    pub fn validar_guardado(&self) -> Result<(f64, f64, Geometria), AppError> {
        let (Some(latitud), Some(longitud)) = (self.latitud, self.longitud) else {
            return Err(validation_error(MSG_CAMPOS_OBLIGATORIOS));
        };
        if validate_not_empty(&self.nombre).is_err() {
            return Err(validation_error(MSG_CAMPOS_OBLIGATORIOS));
        }

        let geometria = match self.forma {
            Forma::Circulo => match self.radio {
                Some(radio) if radio.is_finite() && radio > 0.0 => Geometria::Circulo { radio },
                _ => return Err(validation_error(MSG_RADIO_REQUERIDO)),
            },
            Forma::Poligono => match &self.puntos {
                Some(puntos) if puntos.len() >= MIN_VERTICES_POLIGONO => Geometria::Poligono {
                    puntos: puntos.clone(),
                },
                _ => return Err(validation_error(MSG_VERTICES_INSUFICIENTES)),
            },
        };

        self.validate()?;
        Ok((latitud, longitud, geometria))
    }

    /// Construye la geocerca final a partir del formulario ya validado
    pub fn a_geocerca(&self, id: String, fecha_creacion: DateTime<Utc>) -> Result<Geocerca, AppError> {
        let (latitud, longitud, geometria) = self.validar_guardado()?;
        Ok(Geocerca {
            id,
            nombre: self.nombre.trim().to_string(),
            descripcion: self.descripcion.clone(),
            zona: self.zona.clone(),
            tipo: self.tipo,
            prioridad: self.prioridad,
            alertas: self.alertas,
            activa: self.activa,
            color: self.color.clone(),
            fecha_creacion,
            latitud,
            longitud,
            geometria,
        })
    }

    pub fn aplicar(&mut self, cambios: CambiosFormulario) {
        let CambiosFormulario {
            nombre,
            descripcion,
            latitud,
            longitud,
            radio,
            puntos,
            color,
            tipo,
            forma,
            activa,
            zona,
            prioridad,
            alertas,
        } = cambios;

        if let Some(v) = nombre {
            self.nombre = v;
        }
        if let Some(v) = descripcion {
            self.descripcion = v;
        }
        if let Some(v) = latitud {
            self.latitud = Some(v);
        }
        if let Some(v) = longitud {
            self.longitud = Some(v);
        }
        if let Some(v) = radio {
            self.radio = Some(v);
        }
        if let Some(v) = puntos {
            self.puntos = Some(v);
        }
        if let Some(v) = color {
            self.color = v;
        }
        if let Some(v) = tipo {
            self.tipo = v;
        }
        if let Some(v) = forma {
            self.forma = v;
        }
        if let Some(v) = activa {
            self.activa = v;
        }
        if let Some(v) = zona {
            self.zona = v;
        }
        if let Some(v) = prioridad {
            self.prioridad = v;
        }
        if let Some(v) = alertas {
            self.alertas = v;
        }
    }
}

/// Parche parcial del formulario (`PATCH /api/editor/formulario`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CambiosFormulario {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub radio: Option<f64>,
    pub puntos: Option<Vec<Punto>>,
    pub color: Option<String>,
    pub tipo: Option<TipoGeocerca>,
    pub forma: Option<Forma>,
    pub activa: Option<bool>,
    pub zona: Option<String>,
    pub prioridad: Option<Prioridad>,
    pub alertas: Option<bool>,
}

/// Filtros del listado (`GET /api/geocercas?q=&tipo=&estado=&forma=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocercaQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub forma: Option<String>,
}

/// Listado filtrado con estadísticas
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocercasListResponse {
    pub geocercas: Vec<Geocerca>,
    pub total: usize,
    pub filtradas: usize,
    pub activas: usize,
    pub inactivas: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formulario_por_defecto() {
        let f = FormularioGeocerca::default();
        assert_eq!(f.latitud, Some(-0.186879));
        assert_eq!(f.radio, Some(300.0));
        assert_eq!(f.zona, "centro");
        assert!(f.alertas);
    }

    #[test]
    fn test_validaciones_de_guardado() {
        let mut f = FormularioGeocerca::default();
        assert_eq!(
            f.validar_guardado().unwrap_err().mensaje_usuario(),
            MSG_CAMPOS_OBLIGATORIOS
        );

        f.nombre = "Parque La Carolina".to_string();
        f.radio = None;
        assert_eq!(f.validar_guardado().unwrap_err().mensaje_usuario(), MSG_RADIO_REQUERIDO);

        f.forma = Forma::Poligono;
        f.puntos = Some(vec![Punto::new(0.0, 0.0), Punto::new(0.1, 0.1)]);
        assert_eq!(
            f.validar_guardado().unwrap_err().mensaje_usuario(),
            MSG_VERTICES_INSUFICIENTES
        );

        f.puntos.as_mut().unwrap().push(Punto::new(0.2, 0.0));
        let (_, _, geometria) = f.validar_guardado().unwrap();
        assert_eq!(geometria.vertices().len(), 3);
    }

    #[test]
    fn test_coordenada_cero_es_valida() {
        let f = FormularioGeocerca {
            nombre: "Ecuador".to_string(),
            latitud: Some(0.0),
            longitud: Some(0.0),
            ..FormularioGeocerca::default()
        };
        assert!(f.validar_guardado().is_ok());

        let sin_lat = FormularioGeocerca { latitud: None, ..f };
        assert!(sin_lat.validar_guardado().is_err());
    }

    #[test]
    fn test_color_invalido() {
        let f = FormularioGeocerca {
            nombre: "X".to_string(),
            color: "rojo".to_string(),
            ..FormularioGeocerca::default()
        };
        assert!(matches!(f.validar_guardado(), Err(AppError::ValidationErrors(_))));
    }

    #[test]
    fn test_aplicar_cambios_parciales() {
        let mut f = FormularioGeocerca::default();
        f.aplicar(CambiosFormulario {
            nombre: Some("Zona Sur".to_string()),
            activa: Some(false),
            ..CambiosFormulario::default()
        });
        assert_eq!(f.nombre, "Zona Sur");
        assert!(!f.activa);
        assert_eq!(f.color, "#3b82f6");
    }
}
