use chrono::{NaiveDate, Utc};

use crate::dto::registro_dto::{DashboardResponse, RegistroQuery, RegistrosListResponse};
use crate::models::auth::Empresa;
use crate::models::mapa::VistaMapaId;
use crate::services::export_service::{self, ArchivoExportado};
use crate::services::filtro_service::FiltrosRegistro;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::validate_date;

fn fecha(valor: Option<&str>, por_defecto: NaiveDate) -> Result<NaiveDate, AppError> {
    match valor.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => validate_date(v).map_err(|_| validation_error("Fecha inválida, usa YYYY-MM-DD")),
        None => Ok(por_defecto),
    }
}

pub struct RegistroController {
    state: AppState,
}

impl RegistroController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Los campos ausentes de la query toman el valor por defecto
    pub async fn listar(&self, query: RegistroQuery) -> Result<RegistrosListResponse, AppError> {
        let todos = self.state.registros.listar().await?;
        let base = FiltrosRegistro::por_defecto(&todos);
        let filtros = FiltrosRegistro {
            vendedor: query.vendedor.unwrap_or_default(),
            cliente: query.cliente.unwrap_or_default(),
            desde: fecha(query.desde.as_deref(), base.desde)?,
            hasta: fecha(query.hasta.as_deref(), base.hasta)?,
            mostrar_pedidos: query.mostrar_pedidos.unwrap_or(base.mostrar_pedidos),
            mostrar_cobros: query.mostrar_cobros.unwrap_or(base.mostrar_cobros),
        };
        if filtros.desde > filtros.hasta {
            return Err(validation_error("La fecha inicial es posterior a la final"));
        }

        let filtrados = filtros.aplicar(&todos);
        let respuesta = RegistrosListResponse {
            total: todos.len(),
            filtrados: filtrados.len(),
            desde: filtros.desde.format("%Y-%m-%d").to_string(),
            hasta: filtros.hasta.format("%Y-%m-%d").to_string(),
            registros: filtrados,
        };

        *self.state.filtros_registros.write().await = Some(filtros);
        self.state.redibujar(VistaMapaId::Registros).await?;
        Ok(respuesta)
    }

    /// CSV de los registros que se ven con los filtros actuales
    pub async fn exportar_csv(&self) -> Result<ArchivoExportado, AppError> {
        let (_, _, filtrados) = self.state.registros_filtrados().await?;
        export_service::registros_csv(&filtrados, Utc::now().date_naive())
    }

    /// Resumen del tablero principal
    pub async fn dashboard(&self, empresa: Empresa) -> Result<DashboardResponse, AppError> {
        let sesion = self.state.auth.sesion_valida().await?;
        let geocercas = self.state.geocercas.listar().await?;
        let registros = self.state.registros.listar().await?;
        let vendedores = {
            let vista = self.state.vendedores.vista();
            let total = vista.read().await.vendedores.len();
            total
        };

        let hoy = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        Ok(DashboardResponse {
            empresa: empresa.nomempresa,
            usuario: sesion.username.clone(),
            iniciales: sesion.iniciales(),
            token_preview: sesion.token_preview(),
            geocercas_activas: geocercas.iter().filter(|g| g.activa).count(),
            vendedores,
            registros_hoy: registros.iter().filter(|r| r.fecha == hoy).count(),
        })
    }
}
