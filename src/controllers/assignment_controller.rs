use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::dto::assignment_dto::{CreateAssignmentRequest, UnassignRequest};
use crate::models::{AssignCommand, AssignmentFilter, AssignmentRecord, AuthenticatedUser, VehicleFilter};
use crate::repositories::FleetRepository;
use crate::services::assignment_service::{audit_ledger, LedgerViolation, DEFAULT_UNASSIGN_REASON};
use crate::services::authorization_service::Action;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Resultado de la auditoría del historial
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAudit {
    pub vehicles_checked: usize,
    pub records_checked: usize,
    pub violations: Vec<LedgerViolation>,
}

pub struct AssignmentController {
    repository: Arc<dyn FleetRepository>,
}

impl AssignmentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filter: AssignmentFilter,
    ) -> Result<Vec<AssignmentRecord>, AppError> {
        user.require(Action::ViewFleet)?;
        self.repository.list_assignments(&filter).await
    }

    pub async fn assign(
        &self,
        user: &AuthenticatedUser,
        request: CreateAssignmentRequest,
    ) -> Result<AssignmentRecord, AppError> {
        user.require(Action::ManageAssignments)?;

        let command = AssignCommand {
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            assigned_by: user.id,
            reason: request.reason,
        };
        self.repository.assign(&command).await
    }

    pub async fn unassign(
        &self,
        user: &AuthenticatedUser,
        vehicle_id: i32,
        request: UnassignRequest,
    ) -> Result<AssignmentRecord, AppError> {
        user.require(Action::ManageAssignments)?;

        let reason = request
            .reason
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UNASSIGN_REASON.to_string());
        self.repository.unassign(vehicle_id, &reason).await
    }

    pub async fn audit(&self, user: &AuthenticatedUser) -> Result<LedgerAudit, AppError> {
        user.require(Action::ManageAssignments)?;

        let vehicles = self.repository.list_vehicles(&VehicleFilter::everything()).await?;
        let records = self
            .repository
            .list_assignments(&AssignmentFilter::default())
            .await?;
        let violations = audit_ledger(&vehicles, &records);

        if !violations.is_empty() {
            warn!("⚠️ Auditoría del historial: {} inconsistencias", violations.len());
        }

        Ok(LedgerAudit {
            vehicles_checked: vehicles.len(),
            records_checked: records.len(),
            violations,
        })
    }
}
