//! Persistencia de geocercas y registros
//!
//! Los controladores solo conocen [`RepositorioGeocercas`]; el backend
//! concreto (memoria, archivo o API remota) se elige por configuración.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendAlmacen, EnvironmentConfig};
use crate::models::geocerca::Geocerca;
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppResult;
use crate::utils::storage::AlmacenLocal;

pub mod local;
pub mod registros;
pub mod remoto;

pub use local::RepositorioLocal;
pub use registros::RepositorioRegistros;
pub use remoto::RepositorioRemoto;

#[async_trait]
pub trait RepositorioGeocercas: Send + Sync {
    async fn listar(&self) -> AppResult<Vec<Geocerca>>;

    async fn obtener(&self, id: &str) -> AppResult<Geocerca>;

    /// Agrega al final de la colección
    async fn crear(&self, geocerca: Geocerca) -> AppResult<Geocerca>;

    /// Reemplaza en su misma posición
    async fn actualizar(&self, geocerca: Geocerca) -> AppResult<Geocerca>;

    async fn eliminar(&self, id: &str) -> AppResult<()>;
}

/// Almacén local según el backend configurado
pub fn almacen_local(config: &EnvironmentConfig) -> AlmacenLocal {
    match config.storage_backend {
        BackendAlmacen::Memoria => AlmacenLocal::memoria(),
        BackendAlmacen::Archivo | BackendAlmacen::Remoto => {
            AlmacenLocal::archivo(config.storage_dir.clone())
        }
    }
}

pub fn repositorio_geocercas(
    config: &EnvironmentConfig,
    almacen: AlmacenLocal,
    auth: Arc<AuthService>,
) -> Arc<dyn RepositorioGeocercas> {
    match config.storage_backend {
        BackendAlmacen::Memoria | BackendAlmacen::Archivo => {
            tracing::info!("💾 Geocercas en almacenamiento local ({:?})", config.storage_backend);
            Arc::new(RepositorioLocal::new(almacen))
        }
        BackendAlmacen::Remoto => {
            tracing::info!("🌐 Geocercas en el API remoto ({})", config.api_url);
            Arc::new(RepositorioRemoto::new(auth))
        }
    }
}
