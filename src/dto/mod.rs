//! DTOs de la API HTTP del servicio

pub mod auth_dto;
pub mod editor_dto;
pub mod geocerca_dto;
pub mod lugar_dto;
pub mod mapa_dto;
pub mod registro_dto;
pub mod response_dto;
pub mod vendedor_dto;
