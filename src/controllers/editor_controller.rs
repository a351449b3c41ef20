//! Acciones del editor de geocercas
//!
//! Cada acción muta el editor bajo su lock, lo suelta y redibuja el mapa de
//! geocercas (entidades + vista previa). El guardado valida primero, escribe
//! en el repositorio sin el lock tomado y solo entonces cierra el formulario.

use chrono::Utc;

use crate::dto::editor_dto::EditorSnapshot;
use crate::dto::geocerca_dto::CambiosFormulario;
use crate::dto::response_dto::ApiResponse;
use crate::models::geocerca::{Forma, Geocerca, Punto};
use crate::models::mapa::VistaMapaId;
use crate::services::editor_service::{EditorGeocercas, Guardado, ResultadoClick};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct EditorController {
    state: AppState,
}

impl EditorController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Ejecuta `accion` sobre el editor, redibuja y devuelve la foto resultante
    async fn con_editor<T>(
        &self,
        accion: impl FnOnce(&mut EditorGeocercas) -> AppResult<T>,
    ) -> AppResult<(T, EditorSnapshot)> {
        let valor = {
            let mut editor = self.state.editor.lock().await;
            accion(&mut *editor)?
        };
        self.state.redibujar(VistaMapaId::Geocercas).await?;
        let snapshot = EditorSnapshot::from(&*self.state.editor.lock().await);
        Ok((valor, snapshot))
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot::from(&*self.state.editor.lock().await)
    }

    pub async fn alternar_modo(&self) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (activo, snapshot) = self.con_editor(|e| Ok(e.alternar_modo_creacion())).await?;
        let mensaje = if activo {
            "Modo creación activado"
        } else {
            "Modo creación desactivado"
        };
        Ok(ApiResponse::success_with_message(snapshot, mensaje))
    }

    pub async fn cambiar_forma(&self, forma: Forma) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self
            .con_editor(|e| {
                e.cambiar_forma(forma);
                Ok(())
            })
            .await?;
        Ok(ApiResponse::success(snapshot))
    }

    pub async fn fijar_radio(&self, radio: f64) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self.con_editor(|e| Ok(e.fijar_radio(radio)?)).await?;
        Ok(ApiResponse::success(snapshot))
    }

    pub async fn click(&self, punto: Punto) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (resultado, snapshot) = self.con_editor(|e| Ok(e.click_mapa(punto))).await?;
        let mensaje = match resultado {
            ResultadoClick::PuntoAgregado { total } => format!("Punto {} agregado", total),
            ResultadoClick::PuntoSeleccionado { punto } => {
                format!("Punto seleccionado ({:.6}, {:.6})", punto.lat, punto.lng)
            }
        };
        Ok(ApiResponse::success_with_message(snapshot, mensaje))
    }

    pub async fn mover_vertice(
        &self,
        indice: usize,
        punto: Punto,
    ) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self
            .con_editor(|e| Ok(e.mover_vertice(indice, punto)?))
            .await?;
        Ok(ApiResponse::success(snapshot))
    }

    pub async fn eliminar_vertice(&self, indice: usize) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self.con_editor(|e| Ok(e.eliminar_vertice(indice)?)).await?;
        Ok(ApiResponse::success_with_message(
            snapshot,
            format!("Vértice {} eliminado", indice + 1),
        ))
    }

    pub async fn confirmar(&self) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self.con_editor(|e| Ok(e.confirmar()?)).await?;
        Ok(ApiResponse::success_with_message(
            snapshot,
            "Completa los datos de la geocerca",
        ))
    }

    pub async fn crear_en_punto_seleccionado(&self) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self
            .con_editor(|e| Ok(e.crear_en_punto_seleccionado()?))
            .await?;
        Ok(ApiResponse::success(snapshot))
    }

    /// Abre el formulario de una geocerca persistida
    pub async fn editar(&self, id: &str) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let geocerca = self.state.geocercas.obtener(id).await?;
        let (_, snapshot) = self
            .con_editor(|e| {
                e.editar(&geocerca);
                Ok(())
            })
            .await?;
        Ok(ApiResponse::success(snapshot))
    }

    pub async fn actualizar_formulario(
        &self,
        cambios: CambiosFormulario,
    ) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self
            .con_editor(|e| Ok(e.actualizar_formulario(cambios)?))
            .await?;
        Ok(ApiResponse::success(snapshot))
    }

    /// Valida y persiste. Un formulario inválido no cambia nada.
    pub async fn guardar(&self) -> Result<ApiResponse<Geocerca>, AppError> {
        let (guardado, marca) = {
            let editor = self.state.editor.lock().await;
            (editor.preparar_guardado(Utc::now())?, editor.marca_formulario())
        };

        let (geocerca, mensaje) = match guardado {
            Guardado::Crear(g) => (
                self.state.geocercas.crear(g).await?,
                "Geocerca creada exitosamente",
            ),
            Guardado::Actualizar(g) => (
                self.state.geocercas.actualizar(g).await?,
                "Geocerca actualizada exitosamente",
            ),
        };

        // el lock se soltó durante la escritura
        if !self.state.editor.lock().await.cerrar_formulario_si(&marca) {
            tracing::debug!("✏️ Otro formulario se abrió mientras se guardaba; se deja abierto");
        }
        self.state.redibujar(VistaMapaId::Geocercas).await?;

        tracing::info!("💾 {} ({})", mensaje, geocerca.id);
        Ok(ApiResponse::success_with_message(geocerca, mensaje))
    }

    pub async fn cancelar(&self) -> Result<ApiResponse<EditorSnapshot>, AppError> {
        let (_, snapshot) = self
            .con_editor(|e| {
                e.cancelar();
                Ok(())
            })
            .await?;
        Ok(ApiResponse::success_with_message(snapshot, "Edición cancelada"))
    }
}
