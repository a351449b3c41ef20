//! Cliente HTTP del API remoto de la empresa
//!
//! Login, listado paginado de vendedores y CRUD de geocercas. Todas las
//! peticiones llevan `Authorization: Bearer <token>` excepto el login.

use anyhow::Result;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::models::auth::{LoginRequest, LoginResponse};
use crate::models::geocerca::{Geocerca, GeocercaRegistro};
use crate::models::vendedor::{VendedorRequest, VendedoresResponse};
use crate::utils::errors::{AppError, AppResult};

pub const RUTA_LOGIN_REMOTO: &str = "/login/listaempresas";
pub const MSG_SIN_CONEXION: &str = "Error de conexión. Verifica tu conexión a internet.";

/// Mensaje de usuario para cada status HTTP del API remoto
pub fn error_por_status(status: StatusCode) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => {
            AppError::Unauthorized("No autorizado. Inicia sesión nuevamente.".to_string())
        }
        StatusCode::FORBIDDEN => {
            AppError::Forbidden("No tienes permisos para esta acción".to_string())
        }
        StatusCode::NOT_FOUND => AppError::NotFound("Recurso no encontrado".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR => {
            AppError::ExternalApi("Error interno del servidor".to_string())
        }
        otro => AppError::ExternalApi(format!(
            "Error: {} - {}",
            otro.as_u16(),
            otro.canonical_reason().unwrap_or_default()
        )),
    }
}

fn error_de_red(e: reqwest::Error) -> AppError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        log::error!("❌ Sin conexión con el API remoto: {}", e);
        AppError::Network(MSG_SIN_CONEXION.to_string())
    } else {
        log::error!("❌ Error en la petición al API remoto: {}", e);
        AppError::ExternalApi(format!("Error: {}", e))
    }
}

/// Cliente del API remoto
#[derive(Clone)]
pub struct ApiClient {
    pub client: Client,
    pub base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Construye la petición y adjunta el token salvo en el login
    pub fn peticion(&self, method: Method, ruta: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, ruta);
        let builder = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");

        match token {
            Some(token) if !ruta.contains(RUTA_LOGIN_REMOTO) => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn enviar(&self, builder: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = builder.send().await.map_err(error_de_red)?;
        let status = response.status();
        log::debug!("📡 API remoto respondió {}", status);
        if status.is_success() {
            Ok(response)
        } else {
            Err(error_por_status(status))
        }
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        self.enviar(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta inválida del API: {}", e)))
    }

    /// `POST /login/listaempresas`
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        log::info!("🔐 Login remoto para {}", request.nombre_usuario);
        let builder = self
            .peticion(Method::POST, RUTA_LOGIN_REMOTO, None)
            .json(request);
        self.json(builder).await
    }

    /// `GET /Vendedor/todos`
    pub async fn get_vendedores(
        &self,
        token: &str,
        request: &VendedorRequest,
    ) -> AppResult<VendedoresResponse> {
        log::info!(
            "👥 Solicitando vendedores de la empresa {} (página {})",
            request.id_empresa,
            request.pagina
        );
        let builder = self
            .peticion(Method::GET, "/Vendedor/todos", Some(token))
            .query(request);
        self.json(builder).await
    }

    /// `GET /Geocerca`; los registros inválidos se descartan
    pub async fn listar_geocercas(&self, token: &str) -> AppResult<Vec<Geocerca>> {
        let builder = self.peticion(Method::GET, "/Geocerca", Some(token));
        let registros: Vec<serde_json::Value> = self.json(builder).await?;
        Ok(registros
            .into_iter()
            .filter_map(|valor| match serde_json::from_value::<Geocerca>(valor) {
                Ok(g) => Some(g),
                Err(e) => {
                    log::warn!("⚠️ Geocerca remota descartada: {}", e);
                    None
                }
            })
            .collect())
    }

    pub async fn obtener_geocerca(&self, token: &str, id: &str) -> AppResult<Geocerca> {
        let ruta = format!("/Geocerca/{}", urlencoding::encode(id));
        self.json(self.peticion(Method::GET, &ruta, Some(token))).await
    }

    pub async fn crear_geocerca(&self, token: &str, geocerca: &Geocerca) -> AppResult<()> {
        let cuerpo = GeocercaRegistro::from(geocerca.clone());
        self.enviar(self.peticion(Method::POST, "/Geocerca", Some(token)).json(&cuerpo))
            .await?;
        Ok(())
    }

    pub async fn actualizar_geocerca(&self, token: &str, geocerca: &Geocerca) -> AppResult<()> {
        let ruta = format!("/Geocerca/{}", urlencoding::encode(&geocerca.id));
        let cuerpo = GeocercaRegistro::from(geocerca.clone());
        self.enviar(self.peticion(Method::PUT, &ruta, Some(token)).json(&cuerpo))
            .await?;
        Ok(())
    }

    pub async fn eliminar_geocerca(&self, token: &str, id: &str) -> AppResult<()> {
        let ruta = format!("/Geocerca/{}", urlencoding::encode(id));
        self.enviar(self.peticion(Method::DELETE, &ruta, Some(token)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliente() -> ApiClient {
        ApiClient::new("http://api.local/api/").unwrap()
    }

    #[test]
    fn test_bearer_excepto_en_login() {
        let c = cliente();
        let login = c
            .peticion(Method::POST, RUTA_LOGIN_REMOTO, Some("abc"))
            .build()
            .unwrap();
        assert!(login.headers().get("Authorization").is_none());
        assert_eq!(login.url().as_str(), "http://api.local/api/login/listaempresas");

        let vendedores = c
            .peticion(Method::GET, "/Vendedor/todos", Some("abc"))
            .build()
            .unwrap();
        assert_eq!(
            vendedores.headers().get("Authorization").unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_query_de_vendedores() {
        let request = VendedorRequest {
            id_empresa: 7,
            pagina: 2,
            tamanio_pagina: 20,
            termino: None,
            estado: Some(1),
        };
        let built = cliente()
            .peticion(Method::GET, "/Vendedor/todos", Some("t"))
            .query(&request)
            .build()
            .unwrap();
        assert_eq!(
            built.url().query(),
            Some("idEmpresa=7&pagina=2&tamanioPagina=20&estado=1")
        );
    }

    #[test]
    fn test_mensajes_por_status() {
        assert_eq!(
            error_por_status(StatusCode::UNAUTHORIZED).mensaje_usuario(),
            "No autorizado. Inicia sesión nuevamente."
        );
        assert!(error_por_status(StatusCode::UNAUTHORIZED).es_autenticacion());
        assert_eq!(
            error_por_status(StatusCode::FORBIDDEN).mensaje_usuario(),
            "No tienes permisos para esta acción"
        );
        assert_eq!(
            error_por_status(StatusCode::NOT_FOUND).mensaje_usuario(),
            "Recurso no encontrado"
        );
        assert_eq!(
            error_por_status(StatusCode::INTERNAL_SERVER_ERROR).mensaje_usuario(),
            "Error interno del servidor"
        );
        assert_eq!(
            error_por_status(StatusCode::BAD_GATEWAY).mensaje_usuario(),
            "Error: 502 - Bad Gateway"
        );
    }

    #[tokio::test]
    async fn test_sin_conexion_es_error_de_red() {
        let c = ApiClient::new("http://127.0.0.1:9").unwrap();
        let request = LoginRequest {
            nombre_usuario: "demo".to_string(),
            contrasena: "demo".to_string(),
        };
        match c.login(&request).await {
            Err(AppError::Network(msg)) => assert_eq!(msg, MSG_SIN_CONEXION),
            otro => panic!("se esperaba error de red, llegó {:?}", otro.map(|r| r.token)),
        }
    }
}
