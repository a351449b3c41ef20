//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Cada variable tiene un
//! valor por defecto razonable para desarrollo local.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::retry::PoliticaReintento;

/// Backend de persistencia de geocercas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendAlmacen {
    /// Colección en memoria (se pierde al reiniciar)
    Memoria,
    /// Colección completa serializada en un archivo JSON
    Archivo,
    /// API remota de la empresa
    Remoto,
}

impl FromStr for BackendAlmacen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memoria" | "memory" => Ok(Self::Memoria),
            "archivo" | "file" | "local" => Ok(Self::Archivo),
            "remoto" | "remote" | "api" => Ok(Self::Remoto),
            otro => Err(format!("Backend de almacenamiento desconocido: {}", otro)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// URL base del API remoto (login, vendedores, geocercas remotas)
    pub api_url: String,
    pub storage_backend: BackendAlmacen,
    pub storage_dir: PathBuf,
    pub nominatim_url: String,
    /// Código ISO del país al que se restringe la búsqueda de lugares
    pub geocoding_country: String,
    pub geocoding_country_name: String,
    pub page_size: u32,
    pub map_init_max_attempts: u32,
    pub map_init_delay_ms: u64,
    pub search_debounce_ms: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            api_url: "https://localhost:7014/api".to_string(),
            storage_backend: BackendAlmacen::Archivo,
            storage_dir: PathBuf::from("./data"),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoding_country: "ec".to_string(),
            geocoding_country_name: "Ecuador".to_string(),
            page_size: 20,
            map_init_max_attempts: 5,
            map_init_delay_ms: 1000,
            search_debounce_ms: 300,
        }
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: var_o("PORT", defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            api_url: env::var("API_URL").unwrap_or(defaults.api_url),
            storage_backend: var_o("STORAGE_BACKEND", defaults.storage_backend),
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            nominatim_url: env::var("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            geocoding_country: env::var("GEOCODING_COUNTRY").unwrap_or(defaults.geocoding_country),
            geocoding_country_name: env::var("GEOCODING_COUNTRY_NAME")
                .unwrap_or(defaults.geocoding_country_name),
            page_size: var_o("PAGE_SIZE", defaults.page_size),
            map_init_max_attempts: var_o("MAP_INIT_MAX_ATTEMPTS", defaults.map_init_max_attempts),
            map_init_delay_ms: var_o("MAP_INIT_DELAY_MS", defaults.map_init_delay_ms),
            search_debounce_ms: var_o("SEARCH_DEBOUNCE_MS", defaults.search_debounce_ms),
        }
    }

    /// Configuración para tests: memoria, reintentos cortos, sin debounce perceptible
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            storage_backend: BackendAlmacen::Memoria,
            map_init_max_attempts: 3,
            map_init_delay_ms: 10,
            search_debounce_ms: 5,
            ..Self::default()
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Política de reintentos para la inicialización del mapa
    pub fn politica_mapa(&self) -> PoliticaReintento {
        PoliticaReintento::new(
            self.map_init_max_attempts,
            Duration::from_millis(self.map_init_delay_ms),
        )
    }

    pub fn debounce_busqueda(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn var_o<T: FromStr>(nombre: &str, por_defecto: T) -> T {
    match env::var(nombre) {
        Ok(valor) => match valor.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("⚠️ Valor inválido para {}: '{}', usando el valor por defecto", nombre, valor);
                por_defecto
            }
        },
        Err(_) => por_defecto,
    }
}
