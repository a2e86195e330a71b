//! Fleet Management API
//!
//! Backend de gestión de flota: vehículos, conductores, historial de
//! asignaciones, mantenimiento, combustible, usuarios y configuración.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::{cors_layer, require_auth};
use crate::routes::{
    assignment_routes, auth_routes, compliance_routes, driver_routes, record_routes,
    settings_routes, user_routes, vehicle_routes,
};
use crate::state::AppState;

/// Construir el router completo de la API
///
/// `/health` y `/api/auth/login` son públicos; el resto pasa por
/// `require_auth`.
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/auth", auth_routes::create_session_router())
        .nest("/api/users", user_routes::create_user_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/drivers", driver_routes::create_driver_router())
        .nest("/api/assignments", assignment_routes::create_assignment_router())
        .nest("/api/maintenance", record_routes::create_maintenance_router())
        .nest("/api/fuel", record_routes::create_fuel_router())
        .nest("/api/settings", settings_routes::create_settings_router())
        .nest("/api/compliance", compliance_routes::create_compliance_router())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes::create_public_auth_router())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "fleet-management",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
