use serde::{Deserialize, Serialize};
use validator::Validate;

/// Empresa a la que el usuario tiene acceso
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empresa {
    pub id: i64,
    pub nomempresa: String,
    #[serde(default)]
    pub flag: bool,
}

/// Request de login (`POST /login/listaempresas`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "El usuario es obligatorio"))]
    pub nombre_usuario: String,

    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub contrasena: String,
}

/// Response de login del API remoto
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub listado: Vec<Empresa>,
}

/// Sesión del usuario autenticado (se persiste bajo `auth_user`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sesion {
    pub username: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa_seleccionada: Option<Empresa>,
    #[serde(default)]
    pub empresas: Vec<Empresa>,
}

impl Sesion {
    /// Iniciales para el avatar: primera letra de cada parte separada por '-'
    pub fn iniciales(&self) -> String {
        let iniciales: String = self
            .username
            .split('-')
            .filter_map(|parte| parte.chars().next())
            .collect::<String>()
            .to_uppercase()
            .chars()
            .take(2)
            .collect();
        if iniciales.is_empty() {
            "U".to_string()
        } else {
            iniciales
        }
    }

    /// Últimos 12 caracteres del token, para mostrar sin exponerlo
    pub fn token_preview(&self) -> String {
        let total = self.token.chars().count();
        let cola: String = self.token.chars().skip(total.saturating_sub(12)).collect();
        format!("...{}", cola)
    }

    pub fn nombre_empresa(&self) -> String {
        self.empresa_seleccionada
            .as_ref()
            .map(|e| e.nomempresa.clone())
            .unwrap_or_else(|| "Sin empresa".to_string())
    }
}

/// Sesión visible para el front-end (sin el token completo)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SesionInfo {
    pub username: String,
    pub iniciales: String,
    pub token_preview: String,
    pub empresa: String,
    pub empresa_seleccionada: Option<Empresa>,
    pub empresas: Vec<Empresa>,
}

impl From<&Sesion> for SesionInfo {
    fn from(s: &Sesion) -> Self {
        Self {
            username: s.username.clone(),
            iniciales: s.iniciales(),
            token_preview: s.token_preview(),
            empresa: s.nombre_empresa(),
            empresa_seleccionada: s.empresa_seleccionada.clone(),
            empresas: s.empresas.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sesion(username: &str, token: &str) -> Sesion {
        Sesion {
            username: username.to_string(),
            token: token.to_string(),
            empresa_seleccionada: None,
            empresas: vec![],
        }
    }

    #[test]
    fn test_iniciales() {
        assert_eq!(sesion("juan-perez", "t").iniciales(), "JP");
        assert_eq!(sesion("admin", "t").iniciales(), "A");
        assert_eq!(sesion("a-b-c", "t").iniciales(), "AB");
        assert_eq!(sesion("", "t").iniciales(), "U");
    }

    #[test]
    fn test_token_preview_y_empresa() {
        let s = sesion("ana", "aaaa.bbbb.0123456789AB");
        assert_eq!(s.token_preview(), "...0123456789AB");
        assert_eq!(sesion("ana", "corto").token_preview(), "...corto");
        assert_eq!(s.nombre_empresa(), "Sin empresa");
    }

    #[test]
    fn test_login_request_camel_case() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"nombreUsuario":"ana","contrasena":"secreto"}"#).unwrap();
        assert!(req.validate().is_ok());

        let vacio = LoginRequest {
            nombre_usuario: String::new(),
            contrasena: "x".to_string(),
        };
        assert!(vacio.validate().is_err());
    }
}
