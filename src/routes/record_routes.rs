//! Rutas de mantenimiento (`/api/maintenance`) y combustible (`/api/fuel`)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};

use crate::controllers::record_controller::RecordController;
use crate::dto::record_dto::{
    CreateFuelRequest, CreateMaintenanceRequest, UpdateFuelRequest, UpdateMaintenanceRequest,
};
use crate::models::{AuthenticatedUser, FuelRecord, MaintenanceRecord, RecordFilter};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{QueryParams, ValidatedJson};

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenance).post(create_maintenance))
        .route("/:id", put(update_maintenance))
}

pub fn create_fuel_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fuel).post(create_fuel))
        .route("/:id", put(update_fuel))
}

async fn list_maintenance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    QueryParams(filter): QueryParams<RecordFilter>,
) -> Result<Json<Vec<MaintenanceRecord>>, AppError> {
    let controller = RecordController::new(&state);
    Ok(Json(controller.list_maintenance(&user, filter).await?))
}

async fn create_maintenance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<MaintenanceRecord>), AppError> {
    let controller = RecordController::new(&state);
    let record = controller.create_maintenance(&user, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_maintenance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateMaintenanceRequest>,
) -> Result<Json<MaintenanceRecord>, AppError> {
    let controller = RecordController::new(&state);
    Ok(Json(controller.update_maintenance(&user, id, request).await?))
}

async fn list_fuel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    QueryParams(filter): QueryParams<RecordFilter>,
) -> Result<Json<Vec<FuelRecord>>, AppError> {
    let controller = RecordController::new(&state);
    Ok(Json(controller.list_fuel(&user, filter).await?))
}

async fn create_fuel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateFuelRequest>,
) -> Result<(StatusCode, Json<FuelRecord>), AppError> {
    let controller = RecordController::new(&state);
    let record = controller.create_fuel(&user, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_fuel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateFuelRequest>,
) -> Result<Json<FuelRecord>, AppError> {
    let controller = RecordController::new(&state);
    Ok(Json(controller.update_fuel(&user, id, request).await?))
}
