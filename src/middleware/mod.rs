//! Middleware del sistema
//!
//! Este módulo contiene el middleware de autenticación y CORS.

pub mod auth;
pub mod cors;

pub use auth::require_auth;
pub use cors::cors_layer;
