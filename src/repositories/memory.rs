//! Repositorio en memoria
//!
//! Doble de tests con la misma semántica que `PgRepository`. Todas las
//! escrituras se serializan detrás de un único `RwLock`, así cada operación
//! sobre el historial es atómica igual que una transacción.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::dto::record_dto::{
    CreateFuelRequest, CreateMaintenanceRequest, UpdateFuelRequest, UpdateMaintenanceRequest,
};
use crate::dto::settings_dto::UpdateSettingRequest;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::{
    AssignCommand, AssignmentFilter, AssignmentRecord, Driver, DriverFilter, DriverStatus,
    FuelRecord, MaintenanceRecord, NewUser, RecordFilter, SystemSetting, User, UserChanges,
    UserRole, Vehicle, VehicleFilter, VehicleStatus,
};
use crate::repositories::{
    AssignmentRepository, DriverRepository, RecordRepository, SettingsRepository, UserRepository,
    VehicleRepository,
};
use crate::services::assignment_service::{
    check_assignable, release_reason_for_driver, release_reason_for_vehicle, REASSIGNED_REASON,
    VEHICLE_REMOVED_REASON,
};
use crate::services::authorization_service::{
    authorize_vehicle_update, ensure_super_admin_remains,
};
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

#[derive(Debug, Default)]
struct Sequences {
    users: i32,
    vehicles: i32,
    drivers: i32,
    assignments: i32,
    maintenance: i32,
    fuel: i32,
}

fn next(sequence: &mut i32) -> i32 {
    *sequence += 1;
    *sequence
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    vehicles: BTreeMap<i32, Vehicle>,
    drivers: BTreeMap<i32, Driver>,
    assignments: BTreeMap<i32, AssignmentRecord>,
    maintenance: BTreeMap<i32, MaintenanceRecord>,
    fuel: BTreeMap<i32, FuelRecord>,
    settings: BTreeMap<String, SystemSetting>,
    sequences: Sequences,
}

impl Tables {
    fn active_vehicle(&self, id: i32) -> AppResult<Vehicle> {
        self.vehicles
            .get(&id)
            .filter(|vehicle| vehicle.is_active)
            .cloned()
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    fn driver(&self, id: i32) -> AppResult<Driver> {
        self.drivers
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("Driver", id))
    }

    fn active_for_driver(&self, driver_id: i32) -> Option<&AssignmentRecord> {
        self.assignments
            .values()
            .find(|record| record.is_active && record.driver_id == driver_id)
    }

    fn close_active_for_vehicle(
        &mut self,
        vehicle_id: i32,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Option<AssignmentRecord> {
        let record = self
            .assignments
            .values_mut()
            .find(|record| record.is_active && record.vehicle_id == vehicle_id)?;
        record.close(at, reason);
        Some(record.clone())
    }

    fn release_vehicle(&mut self, vehicle_id: i32, at: DateTime<Utc>) {
        if let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) {
            vehicle.assigned_driver_id = None;
            vehicle.status = VehicleStatus::Available;
            vehicle.updated_at = at;
        }
    }

    fn check_registration_unique(&self, registration: Option<&str>, except: i32) -> AppResult<()> {
        let Some(registration) = registration else {
            return Ok(());
        };
        let taken = self.vehicles.values().any(|vehicle| {
            vehicle.id != except && vehicle.registration_number.as_deref() == Some(registration)
        });
        if taken {
            return Err(validation_error("registrationNumber", "already exists"));
        }
        Ok(())
    }

    fn check_license_unique(&self, license: &str, except: i32) -> AppResult<()> {
        let taken = self
            .drivers
            .values()
            .any(|driver| driver.id != except && driver.license_number == license);
        if taken {
            return Err(validation_error("licenseNumber", "already exists"));
        }
        Ok(())
    }

    fn check_user_unique(&self, username: Option<&str>, email: Option<&str>, except: i32) -> AppResult<()> {
        for user in self.users.values().filter(|user| user.id != except) {
            if username == Some(user.username.as_str()) {
                return Err(validation_error("username", "already exists"));
            }
            if email == Some(user.email.as_str()) {
                return Err(validation_error("email", "already exists"));
            }
        }
        Ok(())
    }

    fn ensure_references(&self, vehicle_id: i32, driver_id: Option<i32>) -> AppResult<()> {
        self.active_vehicle(vehicle_id)?;
        if let Some(driver_id) = driver_id {
            self.driver(driver_id)?;
        }
        Ok(())
    }
}

/// Repositorio en memoria compartible entre clones
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.username == username).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn count_users(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(Some(user.username.as_str()), Some(user.email.as_str()), 0)?;

        let id = next(&mut tables.sequences.users);
        let user = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let target = tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("User", id))?;

        let super_admins = tables
            .users
            .values()
            .filter(|user| user.role == UserRole::SuperAdmin && user.is_active)
            .count() as i64;
        ensure_super_admin_remains(&target, &changes, super_admins)?;
        tables.check_user_unique(changes.username.as_deref(), changes.email.as_deref(), id)?;

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| not_found_error("User", id))?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl VehicleRepository for InMemoryRepository {
    async fn find_vehicle(&self, id: i32) -> AppResult<Option<Vehicle>> {
        let tables = self.tables.read().await;
        Ok(tables.vehicles.get(&id).filter(|vehicle| vehicle.is_active).cloned())
    }

    async fn list_vehicles(&self, filter: &VehicleFilter) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vehicles
            .values()
            .filter(|vehicle| filter.matches(vehicle))
            .cloned()
            .collect())
    }

    async fn create_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        tables.check_registration_unique(request.registration_number.as_deref(), 0)?;

        let now = Utc::now();
        let id = next(&mut tables.sequences.vehicles);
        let vehicle = Vehicle {
            id,
            make: request.make.clone(),
            model: request.model.clone(),
            year: request.year,
            registration_number: request.registration_number.clone(),
            chassis_number: request.chassis_number.clone(),
            engine_number: request.engine_number.clone(),
            fuel_type: request.fuel_type.clone(),
            horsepower: request.horsepower,
            seats: request.seats,
            mileage: request.mileage,
            location: request.location.clone(),
            registration_expiry: request.registration_expiry,
            insurance_expiry: request.insurance_expiry,
            roadworthiness_expiry: request.roadworthiness_expiry,
            annual_fee_expiry: request.annual_fee_expiry,
            status: request.status.unwrap_or(VehicleStatus::Available),
            assigned_driver_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle(
        &self,
        id: i32,
        request: &UpdateVehicleRequest,
        actor: UserRole,
    ) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        let mut vehicle = tables.active_vehicle(id)?;
        authorize_vehicle_update(actor, &vehicle, request.status)?;
        tables.check_registration_unique(request.registration_number.as_deref(), id)?;

        let now = Utc::now();
        let release = request
            .status
            .and_then(|status| release_reason_for_vehicle(&vehicle, status));
        request.apply_to(&mut vehicle);
        vehicle.updated_at = now;

        if let Some(reason) = release {
            tables.close_active_for_vehicle(id, &reason, now);
        }
        tables.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    async fn remove_vehicle(&self, id: i32) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        let mut vehicle = tables.active_vehicle(id)?;

        let now = Utc::now();
        tables.close_active_for_vehicle(id, VEHICLE_REMOVED_REASON, now);
        vehicle.status = VehicleStatus::Retired;
        vehicle.assigned_driver_id = None;
        vehicle.is_active = false;
        vehicle.updated_at = now;
        tables.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }
}

#[async_trait]
impl DriverRepository for InMemoryRepository {
    async fn find_driver(&self, id: i32) -> AppResult<Option<Driver>> {
        Ok(self.tables.read().await.drivers.get(&id).cloned())
    }

    async fn list_drivers(&self, filter: &DriverFilter) -> AppResult<Vec<Driver>> {
        let tables = self.tables.read().await;
        let mut drivers: Vec<Driver> = tables
            .drivers
            .values()
            .filter(|driver| filter.matches(driver))
            .filter(|driver| {
                !filter.unassigned_only || tables.active_for_driver(driver.id).is_none()
            })
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(drivers)
    }

    async fn create_driver(&self, request: &CreateDriverRequest) -> AppResult<Driver> {
        let mut tables = self.tables.write().await;
        tables.check_license_unique(&request.license_number, 0)?;

        let now = Utc::now();
        let id = next(&mut tables.sequences.drivers);
        let driver = Driver {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            license_number: request.license_number.clone(),
            license_expiry_date: request.license_expiry_date,
            experience: request.experience,
            status: request.status.unwrap_or(DriverStatus::Active),
            created_at: now,
            updated_at: now,
        };
        tables.drivers.insert(id, driver.clone());
        Ok(driver)
    }

    async fn update_driver(&self, id: i32, request: &UpdateDriverRequest) -> AppResult<Driver> {
        let mut tables = self.tables.write().await;
        let mut driver = tables.driver(id)?;
        if let Some(license) = &request.license_number {
            tables.check_license_unique(license, id)?;
        }

        let now = Utc::now();
        let release = request
            .status
            .and_then(|status| release_reason_for_driver(&driver, status));
        request.apply_to(&mut driver);
        driver.updated_at = now;

        if let Some(reason) = release {
            let vehicle_id = tables.active_for_driver(id).map(|record| record.vehicle_id);
            if let Some(vehicle_id) = vehicle_id {
                tables.close_active_for_vehicle(vehicle_id, &reason, now);
                tables.release_vehicle(vehicle_id, now);
            }
        }
        tables.drivers.insert(id, driver.clone());
        Ok(driver)
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRepository {
    async fn list_assignments(&self, filter: &AssignmentFilter) -> AppResult<Vec<AssignmentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .values()
            .rev()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn assign(&self, command: &AssignCommand) -> AppResult<AssignmentRecord> {
        let mut tables = self.tables.write().await;
        let vehicle = tables.active_vehicle(command.vehicle_id)?;
        let driver = tables.driver(command.driver_id)?;
        check_assignable(&vehicle, &driver, tables.active_for_driver(driver.id))?;

        let now = Utc::now();
        tables.close_active_for_vehicle(vehicle.id, REASSIGNED_REASON, now);

        let id = next(&mut tables.sequences.assignments);
        let record = AssignmentRecord {
            id,
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            assigned_date: now,
            unassigned_date: None,
            reason: command.reason.clone(),
            assigned_by: command.assigned_by,
            is_active: true,
        };
        tables.assignments.insert(id, record.clone());

        if let Some(vehicle) = tables.vehicles.get_mut(&vehicle.id) {
            vehicle.assigned_driver_id = Some(driver.id);
            vehicle.status = VehicleStatus::Assigned;
            vehicle.updated_at = now;
        }
        Ok(record)
    }

    async fn unassign(&self, vehicle_id: i32, reason: &str) -> AppResult<AssignmentRecord> {
        let mut tables = self.tables.write().await;
        tables.active_vehicle(vehicle_id)?;

        let now = Utc::now();
        let record = tables
            .close_active_for_vehicle(vehicle_id, reason, now)
            .ok_or_else(|| {
                AppError::NotFound(format!("No active assignment for vehicle '{}'", vehicle_id))
            })?;
        tables.release_vehicle(vehicle_id, now);
        Ok(record)
    }
}

#[async_trait]
impl RecordRepository for InMemoryRepository {
    async fn list_maintenance(&self, filter: RecordFilter) -> AppResult<Vec<MaintenanceRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<MaintenanceRecord> = tables
            .maintenance
            .values()
            .filter(|record| filter.vehicle_id.map_or(true, |id| record.vehicle_id == id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.service_date.cmp(&a.service_date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn create_maintenance(&self, request: &CreateMaintenanceRequest) -> AppResult<MaintenanceRecord> {
        let mut tables = self.tables.write().await;
        tables.ensure_references(request.vehicle_id, None)?;

        let id = next(&mut tables.sequences.maintenance);
        let record = MaintenanceRecord {
            id,
            vehicle_id: request.vehicle_id,
            service_type: request.service_type.clone(),
            description: request.description.clone(),
            cost: request.cost,
            service_date: request.service_date,
            next_service_date: request.next_service_date,
            mileage_at_service: request.mileage_at_service,
            performed_by: request.performed_by.clone(),
            created_at: Utc::now(),
        };
        tables.maintenance.insert(id, record.clone());
        Ok(record)
    }

    async fn update_maintenance(
        &self,
        id: i32,
        request: &UpdateMaintenanceRequest,
    ) -> AppResult<MaintenanceRecord> {
        let mut tables = self.tables.write().await;
        let record = tables
            .maintenance
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Maintenance record", id))?;
        request.apply_to(record);
        Ok(record.clone())
    }

    async fn list_fuel(&self, filter: RecordFilter) -> AppResult<Vec<FuelRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<FuelRecord> = tables
            .fuel
            .values()
            .filter(|record| filter.vehicle_id.map_or(true, |id| record.vehicle_id == id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.fuel_date.cmp(&a.fuel_date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn create_fuel(&self, request: &CreateFuelRequest) -> AppResult<FuelRecord> {
        let mut tables = self.tables.write().await;
        tables.ensure_references(request.vehicle_id, request.driver_id)?;

        let id = next(&mut tables.sequences.fuel);
        let record = FuelRecord {
            id,
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            fuel_date: request.fuel_date,
            liters: request.liters,
            cost: request.cost,
            mileage: request.mileage,
            station: request.station.clone(),
            created_at: Utc::now(),
        };
        tables.fuel.insert(id, record.clone());
        Ok(record)
    }

    async fn update_fuel(&self, id: i32, request: &UpdateFuelRequest) -> AppResult<FuelRecord> {
        let mut tables = self.tables.write().await;
        let record = tables
            .fuel
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Fuel record", id))?;
        request.apply_to(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn list_settings(&self) -> AppResult<Vec<SystemSetting>> {
        Ok(self.tables.read().await.settings.values().cloned().collect())
    }

    async fn find_setting(&self, key: &str) -> AppResult<Option<SystemSetting>> {
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn upsert_setting(
        &self,
        key: &str,
        request: &UpdateSettingRequest,
        updated_by: i32,
    ) -> AppResult<SystemSetting> {
        let mut tables = self.tables.write().await;
        let description = request.description.clone().or_else(|| {
            tables
                .settings
                .get(key)
                .and_then(|setting| setting.description.clone())
        });
        let setting = SystemSetting {
            key: key.to_string(),
            value: request.value.clone(),
            description,
            updated_by: Some(updated_by),
            updated_at: Utc::now(),
        };
        tables.settings.insert(key.to_string(), setting.clone());
        Ok(setting)
    }
}
