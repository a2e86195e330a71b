//! Data Transfer Objects
//!
//! Cuerpos de request/response de la API. Los requests derivan `Validate`
//! y se extraen con `ValidatedJson`.

pub mod assignment_dto;
pub mod auth_dto;
pub mod driver_dto;
pub mod record_dto;
pub mod settings_dto;
pub mod user_dto;
pub mod vehicle_dto;
