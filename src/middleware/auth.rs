//! Middleware de autenticación
//!
//! Extrae el token Bearer, lo valida y vuelve a leer el usuario de la base de
//! datos en cada request: un cambio de rol o una desactivación tiene efecto
//! inmediato aunque el token siga vigente.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::models::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Token Bearer de la cabecera Authorization
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware de autenticación de sesión
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))?;

    let claims = state.sessions.resolve(&token).await?;

    let user = state
        .repository
        .find_user(claims.user_id()?)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::Unauthenticated("User not found or inactive".to_string()))?;

    // Inyectar usuario autenticado en las extensions
    request
        .extensions_mut()
        .insert(AuthenticatedUser::from_session(&user, &claims));

    Ok(next.run(request).await)
}
