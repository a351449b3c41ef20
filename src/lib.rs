//! Geocercas
//!
//! Servicio para la gestión de geocercas (círculos y polígonos) y vendedores
//! de campo: sesión contra el API de la empresa, editor de geocercas, mapas
//! por vista, reportes de visitas y búsqueda de lugares.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
