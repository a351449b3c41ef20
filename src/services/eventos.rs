//! Acciones de los botones de popups
//!
//! Los popups llevan `data-accion`/`data-id`; el front-end reenvía el clic a
//! `POST /api/mapa/acciones` y aquí se despacha al manejador de la vista que
//! lo registró. Cada registro devuelve una [`Suscripcion`] que lo elimina al
//! soltarse, así una vista desmontada no recibe acciones.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use futures::future::BoxFuture;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::mapa::VistaMapaId;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "accion", rename_all = "kebab-case")]
pub enum AccionMapa {
    ActualizarUbicacion {
        id: String,
        #[serde(default)]
        lat: Option<f64>,
        #[serde(default)]
        lng: Option<f64>,
        #[serde(default)]
        precision: Option<f64>,
    },
    Seleccionar {
        id: String,
    },
}

/// Devuelve `Ok(true)` si la acción fue atendida
pub type ManejadorAccion = Arc<dyn Fn(AccionMapa) -> BoxFuture<'static, AppResult<bool>> + Send + Sync>;

type Manejadores = HashMap<VistaMapaId, Vec<(Uuid, ManejadorAccion)>>;

#[derive(Clone, Default)]
pub struct RegistroEventos {
    manejadores: Arc<Mutex<Manejadores>>,
}

/// Mantiene vivo un manejador; al soltarse lo elimina del registro
pub struct Suscripcion {
    id: Uuid,
    vista: VistaMapaId,
    registro: Weak<Mutex<Manejadores>>,
}

impl Suscripcion {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for Suscripcion {
    fn drop(&mut self) {
        if let Some(manejadores) = self.registro.upgrade() {
            let mut manejadores = match manejadores.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(lista) = manejadores.get_mut(&self.vista) {
                lista.retain(|(id, _)| *id != self.id);
            }
            tracing::debug!("🔕 Manejador {} de '{}' eliminado", self.id, self.vista);
        }
    }
}

impl RegistroEventos {
    pub fn new() -> Self {
        Self::default()
    }

    fn bloquear(&self) -> std::sync::MutexGuard<'_, Manejadores> {
        match self.manejadores.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[must_use = "el manejador se elimina al soltar la suscripción"]
    pub fn suscribir(&self, vista: VistaMapaId, manejador: ManejadorAccion) -> Suscripcion {
        let id = Uuid::new_v4();
        self.bloquear().entry(vista).or_default().push((id, manejador));
        Suscripcion {
            id,
            vista,
            registro: Arc::downgrade(&self.manejadores),
        }
    }

    pub fn suscritos(&self, vista: VistaMapaId) -> usize {
        self.bloquear().get(&vista).map_or(0, Vec::len)
    }

    /// Despacha la acción al primer manejador de la vista que la atienda
    pub async fn despachar(&self, vista: VistaMapaId, accion: AccionMapa) -> AppResult<()> {
        // se copia la lista para no mantener el lock durante los await
        let manejadores: Vec<ManejadorAccion> = self
            .bloquear()
            .get(&vista)
            .map(|lista| lista.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default();

        for manejador in manejadores {
            if manejador(accion.clone()).await? {
                return Ok(());
            }
        }

        Err(AppError::NotFound(format!(
            "Ninguna vista activa atiende la acción en '{}'",
            vista
        )))
    }
}
