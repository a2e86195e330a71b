//! Servicios de dominio
//!
//! Reglas de negocio independientes del transporte HTTP: autorización,
//! ciclo de vida de asignaciones, vencimientos y sesiones.

pub mod assignment_service;
pub mod auth_service;
pub mod authorization_service;
pub mod compliance_service;
pub mod session_service;
