use serde::{Deserialize, Serialize};

use crate::models::user::{User, UserRole};
use crate::services::authorization_service::{self, Action};
use crate::utils::errors::{AppError, AppResult};

/// Claims del JWT de sesión
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user_id
    pub role: UserRole,
    pub jti: String, // identificador de sesión, usado para revocar
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthenticated("Invalid session subject".to_string()))
    }
}

/// Usuario autenticado que el middleware inyecta en las extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
    pub session_id: String,
    pub session_expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_session(user: &User, claims: &SessionClaims) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            // El rol se toma de la base de datos, no del token
            role: user.role,
            session_id: claims.jti.clone(),
            session_expires_at: claims.exp,
        }
    }

    /// Atajo para consultar la tabla de permisos con el rol del usuario
    pub fn require(&self, action: Action) -> AppResult<()> {
        authorization_service::authorize(self.role, action)
    }

    pub fn can(&self, action: Action) -> bool {
        authorization_service::is_allowed(self.role, action)
    }
}
