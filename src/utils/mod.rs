//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, reintentos, debounce y almacenamiento local.

pub mod debounce;
pub mod errors;
pub mod jwt;
pub mod retry;
pub mod storage;
pub mod validation;
