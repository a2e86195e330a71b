//! Modelos de datos
//!
//! Structs que mapean las tablas de PostgreSQL y los filtros de listado.

pub mod assignment;
pub mod auth;
pub mod driver;
pub mod fuel;
pub mod maintenance;
pub mod settings;
pub mod user;
pub mod vehicle;

pub use assignment::{AssignCommand, AssignmentFilter, AssignmentRecord};
pub use auth::{AuthenticatedUser, SessionClaims};
pub use driver::{Driver, DriverFilter, DriverStatus};
pub use fuel::{FuelRecord, RecordFilter};
pub use maintenance::MaintenanceRecord;
pub use settings::SystemSetting;
pub use user::{NewUser, User, UserChanges, UserResponse, UserRole};
pub use vehicle::{Vehicle, VehicleFilter, VehicleStatus};
