use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{CurrentUserResponse, LoginRequest, LoginResponse};
use crate::models::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::ValidatedJson;

/// Rutas públicas de autenticación
pub fn create_public_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Rutas que requieren una sesión válida
pub fn create_session_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.login(request).await?))
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> StatusCode {
    let controller = AuthController::new(&state);
    controller.logout(&user).await;
    StatusCode::NO_CONTENT
}

async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.current_user(&user).await?))
}
