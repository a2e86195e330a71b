//! Servicio de autenticación
//!
//! Verificación de credenciales con bcrypt y emisión de sesiones. El hash se
//! calcula en un hilo bloqueante para no frenar el runtime.

use tracing::{info, warn};

use crate::config::environment::BootstrapAdmin;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::models::{NewUser, User, UserResponse, UserRole};
use crate::repositories::FleetRepository;
use crate::services::session_service::SessionService;
use crate::utils::errors::{AppError, AppResult};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Hashear una contraseña con el coste configurado
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

/// Comparar una contraseña con su hash
pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

/// Autenticar credenciales; `None` si no son válidas o el usuario está desactivado
pub async fn authenticate(
    repository: &dyn FleetRepository,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let Some(user) = repository.find_user_by_username(username).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    if !verify_password(password, &user.password_hash).await? {
        return Ok(None);
    }
    Ok(Some(user))
}

/// Login: verificar credenciales y emitir un token
pub async fn login(
    repository: &dyn FleetRepository,
    sessions: &SessionService,
    request: &LoginRequest,
) -> AppResult<LoginResponse> {
    let user = authenticate(repository, &request.username, &request.password)
        .await?
        .ok_or_else(|| {
            warn!("🔒 Login fallido para '{}'", request.username);
            AppError::Unauthenticated(INVALID_CREDENTIALS.to_string())
        })?;

    let (token, expires_at) = sessions.issue(&user)?;
    info!("✅ Login de '{}' ({})", user.username, user.role);

    Ok(LoginResponse {
        token,
        expires_at,
        user: UserResponse::from(user),
    })
}

/// Crear el primer super admin si la tabla de usuarios está vacía
pub async fn bootstrap_super_admin(
    repository: &dyn FleetRepository,
    admin: &BootstrapAdmin,
    bcrypt_cost: u32,
) -> AppResult<Option<User>> {
    if repository.count_users().await? > 0 {
        return Ok(None);
    }

    let password_hash = hash_password(&admin.password, bcrypt_cost).await?;
    let user = repository
        .create_user(NewUser {
            username: admin.username.clone(),
            password_hash,
            email: admin.email.clone(),
            name: "Super Admin".to_string(),
            role: UserRole::SuperAdmin,
        })
        .await?;

    info!("👑 Super admin inicial creado: '{}'", user.username);
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;

    fn bootstrap() -> BootstrapAdmin {
        BootstrapAdmin {
            username: "root".into(),
            password: "change-me-now".into(),
            email: "root@fleet.local".into(),
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret-pass", 4).await.unwrap();
        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_bootstrap_only_on_empty_store() {
        let repo = InMemoryRepository::new();
        let created = bootstrap_super_admin(&repo, &bootstrap(), 4).await.unwrap();
        assert_eq!(created.map(|user| user.role), Some(UserRole::SuperAdmin));

        let again = bootstrap_super_admin(&repo, &bootstrap(), 4).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let repo = InMemoryRepository::new();
        let sessions = SessionService::new("secret", 3600);
        let admin = bootstrap_super_admin(&repo, &bootstrap(), 4).await.unwrap().unwrap();

        let ok = login(
            &repo,
            &sessions,
            &LoginRequest {
                username: "root".into(),
                password: "change-me-now".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.user.id, admin.id);

        let bad = login(
            &repo,
            &sessions,
            &LoginRequest {
                username: "root".into(),
                password: "nope".into(),
            },
        )
        .await;
        assert!(matches!(bad, Err(AppError::Unauthenticated(_))));

        let unknown = authenticate(&repo, "ghost", "whatever").await.unwrap();
        assert!(unknown.is_none());
    }
}
