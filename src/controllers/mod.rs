//! Controladores HTTP
//!
//! Cada controlador se construye por request a partir del `AppState` y
//! devuelve `ApiResponse`/DTOs o un `AppError`.

pub mod auth_controller;
pub mod editor_controller;
pub mod geocerca_controller;
pub mod lugar_controller;
pub mod mapa_controller;
pub mod registro_controller;
pub mod vendedor_controller;
