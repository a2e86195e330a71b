pub mod assignment_routes;
pub mod auth_routes;
pub mod compliance_routes;
pub mod driver_routes;
pub mod record_routes;
pub mod settings_routes;
pub mod user_routes;
pub mod vehicle_routes;
