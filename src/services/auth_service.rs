//! Servicio de autenticación
//!
//! Mantiene la sesión del usuario (token + empresa seleccionada) y la
//! persiste bajo la clave `auth_user`. Un token es válido mientras su `exp`
//! sea posterior a ahora; cualquier error de autenticación del API remoto
//! cierra la sesión.

use std::future::Future;

use tokio::sync::RwLock;
use validator::Validate;

use crate::clients::ApiClient;
use crate::models::auth::{Empresa, LoginRequest, Sesion};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{decodificar_claims, get_token_remaining_time, token_valido};
use crate::utils::storage::AlmacenLocal;

pub const CLAVE_SESION: &str = "auth_user";
pub const MSG_SIN_EMPRESA: &str = "No hay empresa seleccionada";
pub const MSG_SESION_EXPIRADA: &str = "Sesión expirada. Inicia sesión nuevamente.";

pub struct AuthService {
    api: ApiClient,
    almacen: AlmacenLocal,
    sesion: RwLock<Option<Sesion>>,
}

impl AuthService {
    pub fn new(api: ApiClient, almacen: AlmacenLocal) -> Self {
        Self {
            api,
            almacen,
            sesion: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Recupera la sesión persistida si su token sigue vigente
    pub async fn restaurar(&self) -> AppResult<bool> {
        let guardada: Option<Sesion> = self.almacen.cargar(CLAVE_SESION).await?;
        match guardada {
            Some(sesion) if token_valido(&sesion.token) => {
                let restante = decodificar_claims(&sesion.token)
                    .map(|claims| get_token_remaining_time(&claims))
                    .unwrap_or_default();
                tracing::info!(
                    "🔐 Sesión de '{}' restaurada (expira en {} min)",
                    sesion.username,
                    restante / 60
                );
                *self.sesion.write().await = Some(sesion);
                Ok(true)
            }
            Some(_) => {
                tracing::info!("🔐 Sesión persistida expirada, se descarta");
                self.almacen.eliminar(CLAVE_SESION).await?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Login remoto. La sesión queda sin empresa hasta `seleccionar_empresa`.
    pub async fn login(&self, request: LoginRequest) -> AppResult<Sesion> {
        request.validate()?;

        let respuesta = self.api.login(&request).await.map_err(|e| match e {
            AppError::Unauthorized(_) => {
                AppError::Unauthorized("Usuario o contraseña incorrectos".to_string())
            }
            AppError::Network(_) => {
                AppError::Network("Error de conexión. Verifica el servidor.".to_string())
            }
            otro => otro,
        })?;

        let sesion = Sesion {
            username: request.nombre_usuario,
            token: respuesta.token,
            empresa_seleccionada: None,
            empresas: respuesta.listado,
        };
        self.establecer(sesion.clone()).await?;
        tracing::info!(
            "✅ Login exitoso de '{}' ({} empresas)",
            sesion.username,
            sesion.empresas.len()
        );
        Ok(sesion)
    }

    /// Reemplaza la sesión actual y la persiste
    pub async fn establecer(&self, sesion: Sesion) -> AppResult<()> {
        self.almacen.guardar(CLAVE_SESION, &sesion).await?;
        *self.sesion.write().await = Some(sesion);
        Ok(())
    }

    pub async fn seleccionar_empresa(&self, id: i64) -> AppResult<Sesion> {
        let mut sesion = self.sesion_valida().await?;
        let empresa = sesion
            .empresas
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Empresa {} no disponible", id)))?;

        tracing::info!("🏢 Empresa seleccionada: {}", empresa.nomempresa);
        sesion.empresa_seleccionada = Some(empresa);
        self.establecer(sesion.clone()).await?;
        Ok(sesion)
    }

    pub async fn logout(&self) -> AppResult<()> {
        if let Some(sesion) = self.sesion.write().await.take() {
            tracing::info!("👋 Sesión de '{}' cerrada", sesion.username);
        }
        self.almacen.eliminar(CLAVE_SESION).await
    }

    pub async fn sesion(&self) -> Option<Sesion> {
        self.sesion.read().await.clone()
    }

    /// Sesión con token vigente; si expiró se cierra
    pub async fn sesion_valida(&self) -> AppResult<Sesion> {
        let sesion = self
            .sesion()
            .await
            .ok_or_else(|| AppError::Unauthorized("No hay sesión activa".to_string()))?;

        if !token_valido(&sesion.token) {
            self.logout().await?;
            return Err(AppError::Unauthorized(MSG_SESION_EXPIRADA.to_string()));
        }
        Ok(sesion)
    }

    /// Sesión válida con empresa seleccionada
    pub async fn requerir_empresa(&self) -> AppResult<(Sesion, Empresa)> {
        let sesion = self.sesion_valida().await?;
        match sesion.empresa_seleccionada.clone() {
            Some(empresa) => Ok((sesion, empresa)),
            None => Err(AppError::Forbidden(MSG_SIN_EMPRESA.to_string())),
        }
    }

    /// Ejecuta una llamada remota con la sesión actual. Un 401 cierra la sesión.
    pub async fn con_sesion<T, F, Fut>(&self, operacion: F) -> AppResult<T>
    where
        F: FnOnce(Sesion, Empresa) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let (sesion, empresa) = self.requerir_empresa().await?;
        match operacion(sesion, empresa).await {
            Err(e) if e.es_autenticacion() => {
                tracing::warn!("🔐 El API rechazó el token, cerrando sesión");
                self.logout().await?;
                Err(e)
            }
            otro => otro,
        }
    }
}
