use std::sync::Arc;

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::{AuthenticatedUser, Driver, DriverFilter, DriverStatus, Vehicle, VehicleFilter};
use crate::repositories::FleetRepository;
use crate::services::authorization_service::Action;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub struct DriverController {
    repository: Arc<dyn FleetRepository>,
}

impl DriverController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filter: DriverFilter,
    ) -> Result<Vec<Driver>, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository.list_drivers(&filter).await
    }

    pub async fn get_by_id(&self, user: &AuthenticatedUser, id: i32) -> Result<Driver, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", id))
    }

    /// Vehículos que conduce actualmente
    pub async fn vehicles(&self, user: &AuthenticatedUser, id: i32) -> Result<Vec<Vehicle>, AppError> {
        let driver = self.get_by_id(user, id).await?;
        self.repository
            .list_vehicles(&VehicleFilter::by_driver(driver.id))
            .await
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateDriverRequest,
    ) -> Result<Driver, AppError> {
        user.require(Action::CreateDriver)?;
        self.repository.create_driver(&request).await
    }

    /// El rol `user` solo puede cambiar phone y email
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateDriverRequest,
    ) -> Result<Driver, AppError> {
        user.require(Action::UpdateDriver)?;
        if request.touches_restricted_fields() {
            user.require(Action::EditDriverDetails)?;
        }
        self.repository.update_driver(id, &request).await
    }

    /// Baja: el conductor pasa a `inactive` y se libera su vehículo
    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<Driver, AppError> {
        user.require(Action::DeleteDriver)?;
        self.repository
            .update_driver(id, &UpdateDriverRequest::status_only(DriverStatus::Inactive))
            .await
    }
}
