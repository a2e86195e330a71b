use serde::Deserialize;
use validator::Validate;

use crate::models::UserRole;
use crate::utils::validation::USERNAME_RE;

fn default_role() -> UserRole {
    UserRole::User
}

/// Request para crear un usuario (solo super admin)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(regex = "USERNAME_RE")]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default = "default_role")]
    pub role: UserRole,
}

/// Request para actualizar un usuario existente
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(regex = "USERNAME_RE")]
    pub username: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,
}
