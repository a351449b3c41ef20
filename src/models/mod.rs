//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del dominio y su forma
//! serializada (camelCase, igual que el API remoto y el almacenamiento local).

pub mod auth;
pub mod geocerca;
pub mod mapa;
pub mod registro;
pub mod vendedor;
