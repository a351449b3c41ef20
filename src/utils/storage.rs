//! Almacenamiento local clave → JSON
//!
//! Equivalente en servidor del localStorage del navegador: cada clave guarda
//! un blob JSON completo. El backend de archivo escribe `<dir>/<clave>.json`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};

use crate::utils::errors::{storage_error, AppResult};

pub const CLAVE_GEOCERCAS: &str = "geocercas-maestras";
pub const CLAVE_REGISTROS: &str = "detalle-registros";

#[derive(Debug, Clone)]
pub enum AlmacenLocal {
    Memoria(Arc<Mutex<HashMap<String, String>>>),
    Archivo(PathBuf),
}

impl AlmacenLocal {
    pub fn memoria() -> Self {
        Self::Memoria(Arc::new(Mutex::new(HashMap::new())))
    }

    pub fn archivo(dir: impl Into<PathBuf>) -> Self {
        Self::Archivo(dir.into())
    }

    fn ruta(dir: &std::path::Path, clave: &str) -> PathBuf {
        dir.join(format!("{}.json", clave))
    }

    pub async fn guardar<T: Serialize + ?Sized>(&self, clave: &str, valor: &T) -> AppResult<()> {
        let json = serde_json::to_string_pretty(valor)
            .map_err(|e| storage_error("Error serializando datos", e))?;

        match self {
            Self::Memoria(mapa) => {
                let mut mapa = mapa
                    .lock()
                    .map_err(|e| storage_error("Almacén en memoria bloqueado", e))?;
                mapa.insert(clave.to_string(), json);
            }
            Self::Archivo(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| storage_error("Error creando directorio de datos", e))?;
                let ruta = Self::ruta(dir, clave);
                // escribir a un temporal y renombrar para no dejar el blob a medias
                let temporal = ruta.with_extension("json.tmp");
                tokio::fs::write(&temporal, json)
                    .await
                    .map_err(|e| storage_error("Error escribiendo archivo", e))?;
                tokio::fs::rename(&temporal, &ruta)
                    .await
                    .map_err(|e| storage_error("Error reemplazando archivo", e))?;
            }
        }

        tracing::debug!("💾 Clave '{}' guardada", clave);
        Ok(())
    }

    /// Contenido crudo de una clave; `None` si nunca se guardó
    pub async fn cargar_crudo(&self, clave: &str) -> AppResult<Option<String>> {
        match self {
            Self::Memoria(mapa) => {
                let mapa = mapa
                    .lock()
                    .map_err(|e| storage_error("Almacén en memoria bloqueado", e))?;
                Ok(mapa.get(clave).cloned())
            }
            Self::Archivo(dir) => match tokio::fs::read_to_string(Self::ruta(dir, clave)).await {
                Ok(contenido) => Ok(Some(contenido)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(storage_error("Error leyendo archivo", e)),
            },
        }
    }

    /// Carga y deserializa una clave. Un blob corrupto se trata como ausente.
    pub async fn cargar<T: DeserializeOwned>(&self, clave: &str) -> AppResult<Option<T>> {
        let Some(contenido) = self.cargar_crudo(clave).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&contenido) {
            Ok(valor) => Ok(Some(valor)),
            Err(e) => {
                tracing::warn!("⚠️ Contenido inválido en '{}', se ignora: {}", clave, e);
                Ok(None)
            }
        }
    }

    pub async fn eliminar(&self, clave: &str) -> AppResult<()> {
        match self {
            Self::Memoria(mapa) => {
                let mut mapa = mapa
                    .lock()
                    .map_err(|e| storage_error("Almacén en memoria bloqueado", e))?;
                mapa.remove(clave);
            }
            Self::Archivo(dir) => match tokio::fs::remove_file(Self::ruta(dir, clave)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(storage_error("Error eliminando archivo", e)),
            },
        }
        Ok(())
    }
}
