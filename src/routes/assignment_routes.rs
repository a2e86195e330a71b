use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use validator::Validate;

use crate::controllers::assignment_controller::{AssignmentController, LedgerAudit};
use crate::dto::assignment_dto::{CreateAssignmentRequest, UnassignRequest};
use crate::models::{AssignmentFilter, AssignmentRecord, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{QueryParams, ValidatedJson};

pub fn create_assignment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments).post(create_assignment))
        .route("/audit", get(audit_assignments))
        .route("/vehicle/:vehicle_id", delete(unassign_vehicle))
}

async fn list_assignments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    QueryParams(filter): QueryParams<AssignmentFilter>,
) -> Result<Json<Vec<AssignmentRecord>>, AppError> {
    let controller = AssignmentController::new(&state);
    Ok(Json(controller.list(&user, filter).await?))
}

async fn create_assignment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentRecord>), AppError> {
    let controller = AssignmentController::new(&state);
    let record = controller.assign(&user, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// El cuerpo `{reason}` es opcional
async fn unassign_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<i32>,
    body: Option<Json<UnassignRequest>>,
) -> Result<Json<AssignmentRecord>, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    request.validate()?;

    let controller = AssignmentController::new(&state);
    Ok(Json(controller.unassign(&user, vehicle_id, request).await?))
}

async fn audit_assignments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<LedgerAudit>, AppError> {
    let controller = AssignmentController::new(&state);
    Ok(Json(controller.audit(&user).await?))
}
