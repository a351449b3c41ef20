use crate::dto::auth_dto::{EstadoSesion, LoginResultado};
use crate::dto::response_dto::ApiResponse;
use crate::models::auth::{LoginRequest, SesionInfo};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AuthController {
    state: AppState,
}

impl AuthController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<ApiResponse<LoginResultado>, AppError> {
        let sesion = self.state.auth.login(request).await?;

        // con una sola empresa no hace falta elegir
        let sesion = match sesion.empresas.as_slice() {
            [unica] => self.state.auth.seleccionar_empresa(unica.id).await?,
            _ => sesion,
        };
        self.state.remontar_vendedores().await?;

        let resultado = LoginResultado {
            username: sesion.username.clone(),
            requiere_empresa: sesion.empresa_seleccionada.is_none(),
            empresas: sesion.empresas,
        };
        Ok(ApiResponse::success_with_message(resultado, "Login exitoso"))
    }

    pub async fn seleccionar_empresa(&self, id: i64) -> Result<ApiResponse<SesionInfo>, AppError> {
        let sesion = self.state.auth.seleccionar_empresa(id).await?;
        self.state.remontar_vendedores().await?;
        Ok(ApiResponse::success_with_message(
            SesionInfo::from(&sesion),
            format!("Empresa {} seleccionada", sesion.nombre_empresa()),
        ))
    }

    pub async fn logout(&self) -> Result<ApiResponse<()>, AppError> {
        self.state.auth.logout().await?;
        self.state.remontar_vendedores().await?;
        Ok(ApiResponse::ok("Sesión cerrada"))
    }

    /// Estado de la sesión; un token expirado se descarta aquí mismo
    pub async fn sesion(&self) -> Result<ApiResponse<EstadoSesion>, AppError> {
        let estado = match self.state.auth.sesion_valida().await {
            Ok(sesion) => EstadoSesion {
                autenticado: sesion.empresa_seleccionada.is_some(),
                sesion: Some(SesionInfo::from(&sesion)),
            },
            Err(AppError::Unauthorized(_)) => EstadoSesion {
                autenticado: false,
                sesion: None,
            },
            Err(e) => return Err(e),
        };
        Ok(ApiResponse::success(estado))
    }
}
