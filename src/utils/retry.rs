//! Reintentos acotados
//!
//! Única política de reintento del sistema: número máximo de intentos con
//! espera fija entre ellos. No hay backoff exponencial ni reintentos infinitos.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Política de reintentos con espera fija
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoliticaReintento {
    pub max_intentos: u32,
    pub espera: Duration,
}

impl PoliticaReintento {
    pub fn new(max_intentos: u32, espera: Duration) -> Self {
        Self {
            max_intentos: max_intentos.max(1),
            espera,
        }
    }
}

impl Default for PoliticaReintento {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(1000))
    }
}

/// Ejecuta `operacion` hasta que tenga éxito o se agoten los intentos.
///
/// La closure recibe el número de intento (desde 1). Entre intentos fallidos se
/// espera `politica.espera`; tras el último intento se devuelve su error.
pub async fn reintentar<T, E, F, Fut>(politica: &PoliticaReintento, mut operacion: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut intento = 1;
    loop {
        match operacion(intento).await {
            Ok(valor) => {
                if intento > 1 {
                    tracing::info!("✅ Operación completada en el intento #{}", intento);
                }
                return Ok(valor);
            }
            Err(e) if intento < politica.max_intentos => {
                tracing::debug!(
                    "⏳ Intento #{} de {} fallido: {}. Reintentando en {:?}",
                    intento,
                    politica.max_intentos,
                    e,
                    politica.espera
                );
                tokio::time::sleep(politica.espera).await;
                intento += 1;
            }
            Err(e) => {
                tracing::error!("❌ Se agotaron los {} intentos: {}", politica.max_intentos, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_exito_tras_reintentos() {
        let politica = PoliticaReintento::new(5, Duration::from_millis(1));
        let llamadas = Arc::new(AtomicU32::new(0));
        let contador = llamadas.clone();

        let resultado: Result<u32, String> = reintentar(&politica, |intento| {
            let contador = contador.clone();
            async move {
                contador.fetch_add(1, Ordering::SeqCst);
                if intento < 3 {
                    Err(format!("contenedor sin dimensiones ({})", intento))
                } else {
                    Ok(intento)
                }
            }
        })
        .await;

        assert_eq!(resultado, Ok(3));
        assert_eq!(llamadas.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_se_detiene_al_agotar_intentos() {
        let politica = PoliticaReintento::new(4, Duration::from_millis(1));
        let llamadas = Arc::new(AtomicU32::new(0));
        let contador = llamadas.clone();

        let resultado: Result<(), String> = reintentar(&politica, |_| {
            let contador = contador.clone();
            async move {
                contador.fetch_add(1, Ordering::SeqCst);
                Err("no listo".to_string())
            }
        })
        .await;

        assert_eq!(resultado, Err("no listo".to_string()));
        assert_eq!(llamadas.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_politica_minimo_un_intento() {
        assert_eq!(PoliticaReintento::new(0, Duration::ZERO).max_intentos, 1);
    }
}
