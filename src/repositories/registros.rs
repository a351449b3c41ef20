use tokio::sync::Mutex;

use crate::models::registro::{registros_semilla, Registro};
use crate::utils::errors::AppResult;
use crate::utils::storage::{AlmacenLocal, CLAVE_REGISTROS};

/// Detalle de registros de visitas; se siembra la primera vez que se carga
pub struct RepositorioRegistros {
    almacen: AlmacenLocal,
    cache: Mutex<Option<Vec<Registro>>>,
}

impl RepositorioRegistros {
    pub fn new(almacen: AlmacenLocal) -> Self {
        Self {
            almacen,
            cache: Mutex::new(None),
        }
    }

    pub async fn listar(&self) -> AppResult<Vec<Registro>> {
        let mut cache = self.cache.lock().await;
        if let Some(registros) = cache.as_ref() {
            return Ok(registros.clone());
        }

        let registros = match self.almacen.cargar::<Vec<Registro>>(CLAVE_REGISTROS).await? {
            Some(registros) => registros,
            None => {
                let semilla = registros_semilla();
                tracing::info!("🌱 Sembrando {} registros de ejemplo", semilla.len());
                self.almacen.guardar(CLAVE_REGISTROS, &semilla).await?;
                semilla
            }
        };
        *cache = Some(registros.clone());
        Ok(registros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_siembra_y_persiste() {
        let almacen = AlmacenLocal::memoria();
        let repo = RepositorioRegistros::new(almacen.clone());
        assert_eq!(repo.listar().await.unwrap().len(), 5);

        let persistidos: Vec<Registro> = almacen.cargar(CLAVE_REGISTROS).await.unwrap().unwrap();
        assert_eq!(persistidos.len(), 5);
    }

    #[tokio::test]
    async fn test_usa_lo_persistido() {
        let almacen = AlmacenLocal::memoria();
        let mut uno = registros_semilla();
        uno.truncate(1);
        almacen.guardar(CLAVE_REGISTROS, &uno).await.unwrap();

        let repo = RepositorioRegistros::new(almacen);
        assert_eq!(repo.listar().await.unwrap().len(), 1);
    }
}
