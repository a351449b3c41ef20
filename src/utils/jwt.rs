//! Utilidades JWT
//!
//! El token de sesión lo emite el API remoto; aquí solo se lee su payload
//! para conocer la expiración. La firma no se verifica en este lado.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::errors::AppError;

/// Claims del token de sesión que interesan al front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SesionClaims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiración en segundos desde epoch
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decodificar el payload del token sin verificar la firma
pub fn decodificar_claims(token: &str) -> Result<SesionClaims, AppError> {
    validate_token_format(token)?;

    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| AppError::Unauthorized(format!("Token inválido: {}", e)))?;

    let mut validacion = Validation::new(header.alg);
    validacion.insecure_disable_signature_validation();
    validacion.validate_exp = false;
    validacion.required_spec_claims.clear();
    validacion.algorithms = vec![header.alg, Algorithm::HS256];

    let datos = decode::<SesionClaims>(token, &DecodingKey::from_secret(&[]), &validacion)
        .map_err(|e| AppError::Unauthorized(format!("Token inválido: {}", e)))?;

    Ok(datos.claims)
}

/// Verificar si un token ha expirado
pub fn is_token_expired(claims: &SesionClaims) -> bool {
    claims.exp <= chrono::Utc::now().timestamp()
}

/// Un token es válido si se puede leer y su `exp` es posterior a ahora.
/// Cualquier fallo de decodificación cuenta como inválido.
pub fn token_valido(token: &str) -> bool {
    match decodificar_claims(token) {
        Ok(claims) => !is_token_expired(&claims),
        Err(e) => {
            tracing::debug!("🔑 Token descartado: {}", e);
            false
        }
    }
}

/// Obtener tiempo restante de un token en segundos
pub fn get_token_remaining_time(claims: &SesionClaims) -> i64 {
    (claims.exp - chrono::Utc::now().timestamp()).max(0)
}

/// Validar formato de token (básico)
pub fn validate_token_format(token: &str) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::Unauthorized("Token no puede estar vacío".to_string()));
    }

    if token.split('.').count() != 3 {
        return Err(AppError::Unauthorized(
            "Token debe tener 3 partes separadas por puntos".to_string(),
        ));
    }

    Ok(())
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Header Authorization debe comenzar con 'Bearer '".to_string())
    })?;

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token no puede estar vacío".to_string()));
    }

    Ok(token)
}
