use std::sync::Arc;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::{AuthenticatedUser, Vehicle, VehicleFilter, VehicleStatus};
use crate::repositories::FleetRepository;
use crate::services::assignment_service::check_status_change;
use crate::services::authorization_service::Action;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError};

const ASSIGNMENT_FIELD_MESSAGE: &str = "assignedDriverId can only change through assignments";

pub struct VehicleController {
    repository: Arc<dyn FleetRepository>,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filter: VehicleFilter,
    ) -> Result<Vec<Vehicle>, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository.list_vehicles(&filter).await
    }

    pub async fn get_by_id(&self, user: &AuthenticatedUser, id: i32) -> Result<Vehicle, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> Result<Vehicle, AppError> {
        user.require(Action::CreateVehicle)?;

        if request.assigned_driver_id.is_some() {
            return Err(validation_error("assignedDriverId", ASSIGNMENT_FIELD_MESSAGE));
        }
        check_status_change(request.status)?;

        self.repository.create_vehicle(&request).await
    }

    /// Actualización con permisos por campo
    ///
    /// El rol `user` puede cambiar status, mileage y location; el resto de
    /// campos y cualquier paso a o desde `retired` requieren personal. Liberar
    /// a un vehículo asignado cambiando su estado equivale a desasignarlo.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateVehicleRequest,
    ) -> Result<Vehicle, AppError> {
        user.require(Action::UpdateVehicle)?;
        if request.touches_restricted_fields() {
            user.require(Action::EditVehicleDetails)?;
        }
        if request.status == Some(VehicleStatus::Retired) {
            user.require(Action::RetireVehicle)?;
        }

        if request.assigned_driver_id.is_some() {
            return Err(validation_error("assignedDriverId", ASSIGNMENT_FIELD_MESSAGE));
        }
        check_status_change(request.status)?;

        self.repository.update_vehicle(id, &request, user.role).await
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<Vehicle, AppError> {
        user.require(Action::DeleteVehicle)?;
        self.repository.remove_vehicle(id).await
    }
}
