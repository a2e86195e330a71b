//! Servicio de sesiones
//!
//! Tokens JWT HS256 firmados con `SESSION_SECRET`. Logout añade el `jti` a
//! una lista de revocados que se purga cuando el token habría expirado.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{SessionClaims, User};
use crate::utils::errors::{AppError, AppResult};

/// Emisión y verificación de tokens de sesión
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    // jti -> exp
    revoked: Arc<RwLock<HashMap<String, i64>>>,
}

impl SessionService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
            revoked: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emitir un token para el usuario
    pub fn issue(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = SessionClaims {
            sub: user.id.to_string(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating session token: {}", e)))?;

        debug!("🔑 Sesión emitida para usuario {} (jti {})", user.id, claims.jti);
        Ok((token, expires_at))
    }

    /// Validar firma, expiración y revocación
    pub async fn resolve(&self, token: &str) -> AppResult<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired session".to_string()))?;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AppError::Unauthenticated("Session has been revoked".to_string()));
        }

        Ok(claims)
    }

    /// Revocar una sesión hasta su expiración natural
    pub async fn revoke(&self, jti: &str, exp: i64) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, expires| *expires > now);
        revoked.insert(jti.to_string(), exp);

        let until = Utc
            .timestamp_opt(exp, 0)
            .single()
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        info!("🔒 Sesión {} revocada hasta {}", jti, until);
    }
}
