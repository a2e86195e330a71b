use std::sync::Arc;

use crate::dto::auth_dto::{CurrentUserResponse, LoginRequest, LoginResponse};
use crate::models::{AuthenticatedUser, UserResponse};
use crate::repositories::FleetRepository;
use crate::services::auth_service;
use crate::services::authorization_service::permissions_for_role;
use crate::services::session_service::SessionService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct AuthController {
    repository: Arc<dyn FleetRepository>,
    sessions: SessionService,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            sessions: state.sessions.clone(),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        auth_service::login(self.repository.as_ref(), &self.sessions, &request).await
    }

    pub async fn logout(&self, user: &AuthenticatedUser) {
        self.sessions
            .revoke(&user.session_id, user.session_expires_at)
            .await;
    }

    /// Usuario actual con la lista de acciones que su rol permite
    pub async fn current_user(&self, user: &AuthenticatedUser) -> AppResult<CurrentUserResponse> {
        let stored = self
            .repository
            .find_user(user.id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("User not found or inactive".to_string()))?;

        Ok(CurrentUserResponse {
            permissions: permissions_for_role(stored.role),
            user: UserResponse::from(stored),
        })
    }
}
