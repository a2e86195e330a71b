use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::{AuthenticatedUser, Driver, DriverFilter, Vehicle};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{QueryParams, ValidatedJson};

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/available", get(list_available_drivers))
        .route("/:id", get(get_driver).put(update_driver).delete(delete_driver))
        .route("/:id/vehicles", get(get_driver_vehicles))
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    QueryParams(filter): QueryParams<DriverFilter>,
) -> Result<Json<Vec<Driver>>, AppError> {
    let controller = DriverController::new(&state);
    Ok(Json(controller.list(&user, filter).await?))
}

async fn list_available_drivers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Driver>>, AppError> {
    let controller = DriverController::new(&state);
    Ok(Json(controller.list(&user, DriverFilter::available()).await?))
}

async fn create_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateDriverRequest>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let controller = DriverController::new(&state);
    let driver = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

async fn get_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(&state);
    Ok(Json(controller.get_by_id(&user, id).await?))
}

async fn update_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateDriverRequest>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(&state);
    Ok(Json(controller.update(&user, id, request).await?))
}

async fn delete_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(&state);
    Ok(Json(controller.delete(&user, id).await?))
}

async fn get_driver_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = DriverController::new(&state);
    Ok(Json(controller.vehicles(&user, id).await?))
}
