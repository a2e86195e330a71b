use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::compliance_controller::ComplianceController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::{AuthenticatedUser, Vehicle, VehicleFilter};
use crate::services::compliance_service::VehicleCompliance;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{QueryParams, ValidatedJson};

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/available", get(list_available_vehicles))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route("/:id/compliance", get(get_vehicle_compliance))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    QueryParams(filter): QueryParams<VehicleFilter>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.list(&user, filter).await?;
    Ok(Json(response))
}

async fn list_available_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.list(&user, VehicleFilter::available()).await?;
    Ok(Json(response))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.get_by_id(&user, id).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.update(&user, id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.delete(&user, id).await?;
    Ok(Json(response))
}

async fn get_vehicle_compliance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<VehicleCompliance>, AppError> {
    let controller = ComplianceController::new(&state);
    let response = controller.vehicle(&user, id).await?;
    Ok(Json(response))
}
