//! Debounce de búsquedas
//!
//! Colapsa ráfagas de pulsaciones en una sola ejecución: cada llamada espera el
//! periodo de silencio y solo se ejecuta si ninguna llamada posterior llegó
//! mientras tanto. Las llamadas reemplazadas devuelven `Debounced::Reemplazada`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub struct Debouncer {
    espera: Duration,
    generacion: AtomicU64,
    ultimo_termino: Mutex<Option<String>>,
}

/// Resultado de una búsqueda con debounce
#[derive(Debug, PartialEq)]
pub enum Debounced<T> {
    /// La búsqueda se ejecutó
    Ejecutada(T),
    /// Llegó otra búsqueda durante el periodo de silencio
    Reemplazada,
    /// El término es igual al de la última búsqueda ejecutada
    SinCambios,
}

impl Debouncer {
    pub fn new(espera: Duration) -> Self {
        Self {
            espera,
            generacion: AtomicU64::new(0),
            ultimo_termino: Mutex::new(None),
        }
    }

    pub async fn ejecutar<T, F, Fut>(&self, termino: &str, operacion: F) -> Debounced<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mi_generacion = self.generacion.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.espera).await;

        if self.generacion.load(Ordering::SeqCst) != mi_generacion {
            tracing::debug!("⏭️ Búsqueda '{}' reemplazada por una más reciente", termino);
            return Debounced::Reemplazada;
        }

        {
            let mut ultimo = match self.ultimo_termino.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if ultimo.as_deref() == Some(termino) {
                return Debounced::SinCambios;
            }
            *ultimo = Some(termino.to_string());
        }

        Debounced::Ejecutada(operacion().await)
    }

    /// Como `ejecutar`, pero un `Err` no cuenta como última búsqueda: repetir
    /// el mismo término después de un fallo vuelve a ejecutarse.
    pub async fn ejecutar_falible<T, E, F, Fut>(
        &self,
        termino: &str,
        operacion: F,
    ) -> Debounced<Result<T, E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let resultado = self.ejecutar(termino, operacion).await;
        if let Debounced::Ejecutada(Err(_)) = &resultado {
            self.olvidar(termino);
        }
        resultado
    }

    // solo si nadie registró otro término mientras tanto
    fn olvidar(&self, termino: &str) {
        let mut ultimo = match self.ultimo_termino.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ultimo.as_deref() == Some(termino) {
            *ultimo = None;
        }
    }

    /// Olvida el último término (p. ej. al cerrar el buscador)
    pub fn reiniciar(&self) {
        if let Ok(mut ultimo) = self.ultimo_termino.lock() {
            *ultimo = None;
        }
    }
}
