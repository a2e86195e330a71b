use std::sync::Arc;

use tracing::info;

use crate::dto::record_dto::{
    CreateFuelRequest, CreateMaintenanceRequest, UpdateFuelRequest, UpdateMaintenanceRequest,
};
use crate::models::{AuthenticatedUser, FuelRecord, MaintenanceRecord, RecordFilter};
use crate::repositories::FleetRepository;
use crate::services::authorization_service::Action;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Registros de mantenimiento y combustible
pub struct RecordController {
    repository: Arc<dyn FleetRepository>,
}

impl RecordController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
        }
    }

    pub async fn list_maintenance(
        &self,
        user: &AuthenticatedUser,
        filter: RecordFilter,
    ) -> Result<Vec<MaintenanceRecord>, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository.list_maintenance(filter).await
    }

    pub async fn create_maintenance(
        &self,
        user: &AuthenticatedUser,
        request: CreateMaintenanceRequest,
    ) -> Result<MaintenanceRecord, AppError> {
        user.require(Action::AddRecord)?;
        let record = self.repository.create_maintenance(&request).await?;
        info!(
            "🔧 Mantenimiento '{}' registrado para vehículo {} por {}",
            record.service_type, record.vehicle_id, user.username
        );
        Ok(record)
    }

    pub async fn update_maintenance(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateMaintenanceRequest,
    ) -> Result<MaintenanceRecord, AppError> {
        user.require(Action::UpdateRecord)?;
        self.repository.update_maintenance(id, &request).await
    }

    pub async fn list_fuel(
        &self,
        user: &AuthenticatedUser,
        filter: RecordFilter,
    ) -> Result<Vec<FuelRecord>, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository.list_fuel(filter).await
    }

    pub async fn create_fuel(
        &self,
        user: &AuthenticatedUser,
        request: CreateFuelRequest,
    ) -> Result<FuelRecord, AppError> {
        user.require(Action::AddRecord)?;
        let record = self.repository.create_fuel(&request).await?;
        info!(
            "⛽ Repostaje de {} L registrado para vehículo {}",
            record.liters, record.vehicle_id
        );
        Ok(record)
    }

    pub async fn update_fuel(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateFuelRequest,
    ) -> Result<FuelRecord, AppError> {
        user.require(Action::UpdateRecord)?;
        self.repository.update_fuel(id, &request).await
    }
}
