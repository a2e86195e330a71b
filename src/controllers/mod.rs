//! Controladores
//!
//! Cada controlador comprueba el permiso de la acción antes de tocar el
//! repositorio y delega la transición de estado en él.

pub mod assignment_controller;
pub mod auth_controller;
pub mod compliance_controller;
pub mod driver_controller;
pub mod record_controller;
pub mod settings_controller;
pub mod user_controller;
pub mod vehicle_controller;
