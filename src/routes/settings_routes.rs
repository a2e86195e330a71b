use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::settings_controller::SettingsController;
use crate::dto::settings_dto::UpdateSettingRequest;
use crate::models::{AuthenticatedUser, SystemSetting};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::ValidatedJson;

pub fn create_settings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_settings))
        .route("/:key", get(get_setting).put(upsert_setting))
}

async fn list_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<SystemSetting>>, AppError> {
    let controller = SettingsController::new(&state);
    Ok(Json(controller.list(&user).await?))
}

async fn get_setting(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(key): Path<String>,
) -> Result<Json<SystemSetting>, AppError> {
    let controller = SettingsController::new(&state);
    Ok(Json(controller.get(&user, &key).await?))
}

async fn upsert_setting(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(key): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateSettingRequest>,
) -> Result<Json<SystemSetting>, AppError> {
    let controller = SettingsController::new(&state);
    Ok(Json(controller.upsert(&user, &key, request).await?))
}
