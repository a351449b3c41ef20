//! Guard de rutas protegidas
//!
//! Una ruta protegida exige sesión con token vigente y empresa seleccionada.
//! Si la request trae `Authorization: Bearer`, el token debe ser el de la
//! sesión actual.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::models::auth::Empresa;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::extract_token_from_header;

/// Empresa de la sesión, inyectada en las requests que pasan el guard
#[derive(Debug, Clone)]
pub struct EmpresaActual(pub Empresa);

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (sesion, empresa) = state.auth.requerir_empresa().await?;

    if let Some(valor) = request.headers().get(header::AUTHORIZATION) {
        let valor = valor
            .to_str()
            .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;
        let token = extract_token_from_header(valor)?;
        if token != sesion.token {
            tracing::warn!("🔐 Token de la request distinto al de la sesión");
            return Err(AppError::Unauthorized("Token no corresponde a la sesión".to_string()));
        }
    }

    request.extensions_mut().insert(EmpresaActual(empresa));
    Ok(next.run(request).await)
}
