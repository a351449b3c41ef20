//! Geocercas en el API remoto (`/Geocerca`)

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::geocerca::Geocerca;
use crate::repositories::RepositorioGeocercas;
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppResult;

pub struct RepositorioRemoto {
    auth: Arc<AuthService>,
}

impl RepositorioRemoto {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl RepositorioGeocercas for RepositorioRemoto {
    async fn listar(&self) -> AppResult<Vec<Geocerca>> {
        let api = self.auth.api().clone();
        self.auth
            .con_sesion(|sesion, _| async move { api.listar_geocercas(&sesion.token).await })
            .await
    }

    async fn obtener(&self, id: &str) -> AppResult<Geocerca> {
        let api = self.auth.api().clone();
        self.auth
            .con_sesion(|sesion, _| async move { api.obtener_geocerca(&sesion.token, id).await })
            .await
    }

    async fn crear(&self, geocerca: Geocerca) -> AppResult<Geocerca> {
        let api = self.auth.api().clone();
        self.auth
            .con_sesion(|sesion, _| async move {
                api.crear_geocerca(&sesion.token, &geocerca).await?;
                Ok(geocerca)
            })
            .await
    }

    async fn actualizar(&self, geocerca: Geocerca) -> AppResult<Geocerca> {
        let api = self.auth.api().clone();
        self.auth
            .con_sesion(|sesion, _| async move {
                api.actualizar_geocerca(&sesion.token, &geocerca).await?;
                Ok(geocerca)
            })
            .await
    }

    async fn eliminar(&self, id: &str) -> AppResult<()> {
        let api = self.auth.api().clone();
        self.auth
            .con_sesion(|sesion, _| async move { api.eliminar_geocerca(&sesion.token, id).await })
            .await
    }
}
