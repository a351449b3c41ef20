use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use geocercas::config::EnvironmentConfig;
use geocercas::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🗺️ Geocercas - Gestión de geocercas y vendedores");
    info!("================================================");

    let config = EnvironmentConfig::from_env();
    info!(
        "⚙️ Entorno '{}', almacenamiento {:?}, API {}",
        config.environment, config.storage_backend, config.api_url
    );

    if config.is_development() {
        info!("🛠️ Modo desarrollo: datos de ejemplo y CORS permisivo si no hay orígenes");
    }

    let app_state = AppState::new(config.clone())?;

    // Sesión persistida de una ejecución anterior
    match app_state.auth.restaurar().await {
        Ok(true) => {}
        Ok(false) => info!("🔐 Sin sesión previa, se requiere login"),
        Err(e) => warn!("⚠️ No se pudo restaurar la sesión: {}", e),
    }

    let app = create_app_router(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🔐 Sesión:");
    info!("   POST /api/auth/login - Login contra el API de la empresa");
    info!("   POST /api/auth/empresa - Seleccionar empresa");
    info!("   POST /api/auth/logout - Cerrar sesión");
    info!("   GET  /api/auth/sesion - Estado de la sesión");
    info!("📍 Geocercas:");
    info!("   GET  /api/geocercas - Listar con filtros");
    info!("   POST /api/geocercas - Crear geocerca");
    info!("   GET|PUT|DELETE /api/geocercas/:id");
    info!("   POST /api/geocercas/:id/estado - Activar/desactivar");
    info!("   GET  /api/geocercas/exportar - Descargar JSON");
    info!("✏️ Editor:");
    info!("   GET  /api/editor - Estado del editor");
    info!("   POST /api/editor/modo|forma|radio|click|confirmar|guardar|cancelar");
    info!("   PUT|DELETE /api/editor/vertices/:indice");
    info!("🗺️ Mapas (geocercas|vendedores|registros):");
    info!("   GET  /api/mapa/:vista - Capas y vista actual");
    info!("   POST /api/mapa/:vista/contenedor|reintentar|ajustar|centrar|lugar");
    info!("   POST /api/mapa/acciones - Botones de popups");
    info!("👥 Vendedores:");
    info!("   GET  /api/vendedores - Listado filtrado");
    info!("   POST /api/vendedores/cargar - Cargar página del API");
    info!("   POST /api/vendedores/:id/ubicacion - Actualizar ubicación");
    info!("📋 Registros:");
    info!("   GET  /api/registros - Detalle de visitas");
    info!("   GET  /api/registros/csv - Descargar CSV");
    info!("   GET  /api/lugares/buscar?q= - Buscar lugares");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut senal) => {
                senal.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de señales: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
