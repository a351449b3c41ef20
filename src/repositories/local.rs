//! Geocercas en el almacén local
//!
//! La colección completa se guarda bajo `geocercas-maestras`. Si no existe (o
//! está corrupta) se siembra con los datos de ejemplo. Cada escritura trabaja
//! sobre una copia y solo reemplaza la colección si se pudo persistir.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::geocerca::{geocercas_semilla, Geocerca};
use crate::repositories::RepositorioGeocercas;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::storage::{AlmacenLocal, CLAVE_GEOCERCAS};

pub struct RepositorioLocal {
    almacen: AlmacenLocal,
    coleccion: Mutex<Option<Vec<Geocerca>>>,
}

/// Deserializa registro por registro; los inválidos se descartan
fn parsear_coleccion(valores: Vec<serde_json::Value>) -> Vec<Geocerca> {
    valores
        .into_iter()
        .filter_map(|valor| match serde_json::from_value::<Geocerca>(valor) {
            Ok(g) => Some(g),
            Err(e) => {
                tracing::warn!("⚠️ Geocerca almacenada descartada: {}", e);
                None
            }
        })
        .collect()
}

impl RepositorioLocal {
    pub fn new(almacen: AlmacenLocal) -> Self {
        Self {
            almacen,
            coleccion: Mutex::new(None),
        }
    }

    async fn cargar(&self) -> AppResult<Vec<Geocerca>> {
        match self.almacen.cargar::<Vec<serde_json::Value>>(CLAVE_GEOCERCAS).await? {
            Some(valores) => Ok(parsear_coleccion(valores)),
            None => {
                let semilla = geocercas_semilla();
                tracing::info!("🌱 Sembrando {} geocercas de ejemplo", semilla.len());
                self.almacen.guardar(CLAVE_GEOCERCAS, &semilla).await?;
                Ok(semilla)
            }
        }
    }

    /// Aplica `cambio` sobre una copia, persiste y recién entonces publica
    async fn modificar<T, F>(&self, cambio: F) -> AppResult<T>
    where
        F: FnOnce(&mut Vec<Geocerca>) -> AppResult<T>,
    {
        let mut coleccion = self.coleccion.lock().await;
        let mut copia = match coleccion.as_ref() {
            Some(actual) => actual.clone(),
            None => self.cargar().await?,
        };

        let resultado = cambio(&mut copia)?;
        self.almacen.guardar(CLAVE_GEOCERCAS, &copia).await?;
        *coleccion = Some(copia);
        Ok(resultado)
    }
}

#[async_trait]
impl RepositorioGeocercas for RepositorioLocal {
    async fn listar(&self) -> AppResult<Vec<Geocerca>> {
        let mut coleccion = self.coleccion.lock().await;
        if let Some(actual) = coleccion.as_ref() {
            return Ok(actual.clone());
        }
        let cargada = self.cargar().await?;
        *coleccion = Some(cargada.clone());
        Ok(cargada)
    }

    async fn obtener(&self, id: &str) -> AppResult<Geocerca> {
        self.listar()
            .await?
            .into_iter()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found_error("Geocerca", id))
    }

    async fn crear(&self, geocerca: Geocerca) -> AppResult<Geocerca> {
        self.modificar(|coleccion| {
            if coleccion.iter().any(|g| g.id == geocerca.id) {
                return Err(AppError::Conflict(format!(
                    "Ya existe una geocerca con id '{}'",
                    geocerca.id
                )));
            }
            coleccion.push(geocerca.clone());
            Ok(geocerca)
        })
        .await
    }

    async fn actualizar(&self, geocerca: Geocerca) -> AppResult<Geocerca> {
        self.modificar(|coleccion| {
            let existente = coleccion
                .iter_mut()
                .find(|g| g.id == geocerca.id)
                .ok_or_else(|| not_found_error("Geocerca", &geocerca.id))?;
            *existente = geocerca.clone();
            Ok(geocerca)
        })
        .await
    }

    async fn eliminar(&self, id: &str) -> AppResult<()> {
        self.modificar(|coleccion| {
            let posicion = coleccion
                .iter()
                .position(|g| g.id == id)
                .ok_or_else(|| not_found_error("Geocerca", id))?;
            coleccion.remove(posicion);
            Ok(())
        })
        .await
    }
}
