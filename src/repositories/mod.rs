//! Capa de persistencia
//!
//! Cada agregado expone un trait async. `PgRepository` los implementa sobre
//! PostgreSQL y `InMemoryRepository` en memoria, como doble de tests. Las
//! operaciones que tocan el historial de asignaciones son atómicas en ambas.

use async_trait::async_trait;

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::dto::record_dto::{
    CreateFuelRequest, CreateMaintenanceRequest, UpdateFuelRequest, UpdateMaintenanceRequest,
};
use crate::dto::settings_dto::UpdateSettingRequest;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::{
    AssignCommand, AssignmentFilter, AssignmentRecord, Driver, DriverFilter, FuelRecord,
    MaintenanceRecord, NewUser, RecordFilter, SystemSetting, User, UserChanges, UserRole,
    Vehicle, VehicleFilter,
};
use crate::utils::errors::AppResult;

pub mod assignment_repository;
pub mod driver_repository;
pub mod memory;
pub mod record_repository;
pub mod settings_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use memory::InMemoryRepository;

use sqlx::PgPool;

/// Repositorio sobre PostgreSQL
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn count_users(&self) -> AppResult<i64>;
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    /// Falla con `InvalidState` si retira al último super admin activo
    async fn update_user(&self, id: i32, changes: UserChanges) -> AppResult<User>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Solo vehículos activos (no dados de baja)
    async fn find_vehicle(&self, id: i32) -> AppResult<Option<Vehicle>>;
    async fn list_vehicles(&self, filter: &VehicleFilter) -> AppResult<Vec<Vehicle>>;
    async fn create_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle>;
    /// Cierra el registro activo si el nuevo estado libera al conductor
    ///
    /// `actor` es el rol de quien actualiza; los permisos que dependen del
    /// estado actual se comprueban sobre la fila bloqueada.
    async fn update_vehicle(
        &self,
        id: i32,
        request: &UpdateVehicleRequest,
        actor: UserRole,
    ) -> AppResult<Vehicle>;
    /// Baja lógica: cierra el registro activo y retira el vehículo
    async fn remove_vehicle(&self, id: i32) -> AppResult<Vehicle>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn find_driver(&self, id: i32) -> AppResult<Option<Driver>>;
    async fn list_drivers(&self, filter: &DriverFilter) -> AppResult<Vec<Driver>>;
    async fn create_driver(&self, request: &CreateDriverRequest) -> AppResult<Driver>;
    /// Cierra el registro activo si el conductor deja de estar activo
    async fn update_driver(&self, id: i32, request: &UpdateDriverRequest) -> AppResult<Driver>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn list_assignments(&self, filter: &AssignmentFilter) -> AppResult<Vec<AssignmentRecord>>;
    async fn assign(&self, command: &AssignCommand) -> AppResult<AssignmentRecord>;
    /// Devuelve el registro cerrado; `NotFound` si no había asignación activa
    async fn unassign(&self, vehicle_id: i32, reason: &str) -> AppResult<AssignmentRecord>;
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn list_maintenance(&self, filter: RecordFilter) -> AppResult<Vec<MaintenanceRecord>>;
    async fn create_maintenance(&self, request: &CreateMaintenanceRequest) -> AppResult<MaintenanceRecord>;
    async fn update_maintenance(
        &self,
        id: i32,
        request: &UpdateMaintenanceRequest,
    ) -> AppResult<MaintenanceRecord>;
    async fn list_fuel(&self, filter: RecordFilter) -> AppResult<Vec<FuelRecord>>;
    async fn create_fuel(&self, request: &CreateFuelRequest) -> AppResult<FuelRecord>;
    async fn update_fuel(&self, id: i32, request: &UpdateFuelRequest) -> AppResult<FuelRecord>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn list_settings(&self) -> AppResult<Vec<SystemSetting>>;
    async fn find_setting(&self, key: &str) -> AppResult<Option<SystemSetting>>;
    async fn upsert_setting(
        &self,
        key: &str,
        request: &UpdateSettingRequest,
        updated_by: i32,
    ) -> AppResult<SystemSetting>;
}

/// Repositorio completo que recibe el estado de la aplicación
pub trait FleetRepository:
    UserRepository
    + VehicleRepository
    + DriverRepository
    + AssignmentRepository
    + RecordRepository
    + SettingsRepository
{
}

impl<T> FleetRepository for T where
    T: UserRepository
        + VehicleRepository
        + DriverRepository
        + AssignmentRepository
        + RecordRepository
        + SettingsRepository
{
}
