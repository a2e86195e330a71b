use std::sync::Arc;

use crate::dto::settings_dto::UpdateSettingRequest;
use crate::models::{AuthenticatedUser, SystemSetting};
use crate::repositories::FleetRepository;
use crate::services::authorization_service::Action;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub struct SettingsController {
    repository: Arc<dyn FleetRepository>,
}

impl SettingsController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
        }
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<SystemSetting>, AppError> {
        user.require(Action::ManageSettings)?;
        self.repository.list_settings().await
    }

    pub async fn get(&self, user: &AuthenticatedUser, key: &str) -> Result<SystemSetting, AppError> {
        user.require(Action::ManageSettings)?;
        self.repository
            .find_setting(key)
            .await?
            .ok_or_else(|| not_found_error("Setting", key))
    }

    pub async fn upsert(
        &self,
        user: &AuthenticatedUser,
        key: &str,
        request: UpdateSettingRequest,
    ) -> Result<SystemSetting, AppError> {
        user.require(Action::ManageSettings)?;
        self.repository.upsert_setting(key, &request, user.id).await
    }
}
