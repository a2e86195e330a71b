use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{AuthenticatedUser, DriverFilter, VehicleFilter};
use crate::repositories::FleetRepository;
use crate::services::authorization_service::Action;
use crate::services::compliance_service::{
    build_report, vehicle_compliance, ComplianceReport, VehicleCompliance,
};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Alertas de vencimiento de documentos
pub struct ComplianceController {
    repository: Arc<dyn FleetRepository>,
    threshold_days: i64,
    today: NaiveDate,
}

impl ComplianceController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            threshold_days: state.config.expiry_threshold_days,
            today: state.today(),
        }
    }

    pub async fn report(&self, user: &AuthenticatedUser) -> Result<ComplianceReport, AppError> {
        user.require(Action::ViewFleet)?;

        let vehicles = self.repository.list_vehicles(&VehicleFilter::default()).await?;
        let drivers = self.repository.list_drivers(&DriverFilter::default()).await?;
        Ok(build_report(&vehicles, &drivers, self.today, self.threshold_days))
    }

    pub async fn vehicle(
        &self,
        user: &AuthenticatedUser,
        vehicle_id: i32,
    ) -> Result<VehicleCompliance, AppError> {
        user.require(Action::ViewFleet)?;

        let vehicle = self
            .repository
            .find_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;
        Ok(vehicle_compliance(&vehicle, self.today, self.threshold_days))
    }
}
