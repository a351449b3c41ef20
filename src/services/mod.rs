//! Services module
//!
//! Este módulo contiene la lógica de negocio: sesión, editor de geocercas,
//! renderizado de mapas, filtros, vendedores, búsqueda de lugares y exportación.

pub mod auth_service;
pub mod editor_service;
pub mod eventos;
pub mod export_service;
pub mod filtro_service;
pub mod geocoding_service;
pub mod mapa_service;
pub mod vendedor_service;

pub use auth_service::AuthService;
pub use editor_service::EditorGeocercas;
pub use eventos::RegistroEventos;
pub use geocoding_service::GeocodingService;
pub use mapa_service::{Mapas, RenderizadorMapa};
pub use vendedor_service::MontajeVendedores;
