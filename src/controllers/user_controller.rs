use std::sync::Arc;

use tracing::info;

use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::models::{AuthenticatedUser, NewUser, UserChanges, UserResponse};
use crate::repositories::FleetRepository;
use crate::services::auth_service::hash_password;
use crate::services::authorization_service::Action;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Gestión de usuarios, reservada al super admin
pub struct UserController {
    repository: Arc<dyn FleetRepository>,
    bcrypt_cost: u32,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            bcrypt_cost: state.config.bcrypt_cost,
        }
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<UserResponse>, AppError> {
        user.require(Action::ManageUsers)?;
        let users = self.repository.list_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, user: &AuthenticatedUser, id: i32) -> Result<UserResponse, AppError> {
        user.require(Action::ManageUsers)?;
        self.repository
            .find_user(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error("User", id))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateUserRequest,
    ) -> Result<UserResponse, AppError> {
        user.require(Action::ManageUsers)?;

        let password_hash = hash_password(&request.password, self.bcrypt_cost).await?;
        let created = self
            .repository
            .create_user(NewUser {
                username: request.username,
                password_hash,
                email: request.email,
                name: request.name,
                role: request.role,
            })
            .await?;

        info!("👤 Usuario '{}' creado con rol {} por {}", created.username, created.role, user.username);
        Ok(UserResponse::from(created))
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        user.require(Action::ManageUsers)?;

        let password_hash = match &request.password {
            Some(password) => Some(hash_password(password, self.bcrypt_cost).await?),
            None => None,
        };
        let changes = UserChanges {
            username: request.username,
            password_hash,
            email: request.email,
            name: request.name,
            role: request.role,
            is_active: request.is_active,
        };

        let updated = self.repository.update_user(id, changes).await?;
        Ok(UserResponse::from(updated))
    }

    /// Borrado lógico: `is_active = false`, el rol no se toca
    pub async fn deactivate(&self, user: &AuthenticatedUser, id: i32) -> Result<UserResponse, AppError> {
        user.require(Action::ManageUsers)?;
        let updated = self.repository.update_user(id, UserChanges::deactivate()).await?;
        info!("🚫 Usuario '{}' desactivado por {}", updated.username, user.username);
        Ok(UserResponse::from(updated))
    }
}
