use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::controllers::compliance_controller::ComplianceController;
use crate::models::AuthenticatedUser;
use crate::services::compliance_service::ComplianceReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_compliance_router() -> Router<AppState> {
    Router::new().route("/", get(compliance_report))
}

async fn compliance_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ComplianceReport>, AppError> {
    let controller = ComplianceController::new(&state);
    Ok(Json(controller.report(&user).await?))
}
