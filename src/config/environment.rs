//! Configuración de variables de entorno
//!
//! Este módulo lee la configuración del proceso. `DATABASE_URL` y
//! `SESSION_SECRET` son obligatorias; el resto tiene valores por defecto.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::config::database::DatabaseConfig;
use crate::services::compliance_service::DEFAULT_THRESHOLD_DAYS;

/// Errores al leer la configuración
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Credenciales del primer super admin
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub cors_origins: Vec<String>,
    pub expiry_threshold_days: i64,
    pub bcrypt_cost: u32,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let bootstrap_admin = match (
            optional("BOOTSTRAP_ADMIN_USERNAME"),
            optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                email: optional("BOOTSTRAP_ADMIN_EMAIL")
                    .unwrap_or_else(|| format!("{}@localhost", username)),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            environment: optional("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 3000)?,
            database: DatabaseConfig::new(required("DATABASE_URL")?),
            session_secret: required("SESSION_SECRET")?,
            session_ttl_secs: parsed("SESSION_TTL_SECS", 86_400)?,
            cors_origins: optional("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            expiry_threshold_days: parsed("EXPIRY_THRESHOLD_DAYS", DEFAULT_THRESHOLD_DAYS)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", 30)?,
            bootstrap_admin,
        })
    }

    /// Configuración local sin base de datos real, para tests
    pub fn local(session_secret: &str) -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database: DatabaseConfig::new("postgres://localhost/fleet_test".to_string()),
            session_secret: session_secret.to_string(),
            session_ttl_secs: 3600,
            cors_origins: Vec::new(),
            expiry_threshold_days: DEFAULT_THRESHOLD_DAYS,
            bcrypt_cost: 4,
            log_level: "debug".to_string(),
            request_timeout_secs: 30,
            bootstrap_admin: None,
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config() {
        let config = EnvironmentConfig::local("secret");
        assert_eq!(config.session_secret, "secret");
        assert_eq!(config.expiry_threshold_days, 30);
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "127.0.0.1:0");
    }

    #[test]
    fn test_parsed_reports_invalid_values() {
        // Variable exclusiva de este test para no interferir con otros
        env::set_var("FLEET_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, _> = parsed("FLEET_TEST_BAD_PORT", 3000);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let missing: Result<u16, _> = parsed("FLEET_TEST_UNSET_VALUE", 3000);
        assert_eq!(missing.unwrap(), 3000);
        assert!(matches!(required("FLEET_TEST_UNSET_VALUE"), Err(ConfigError::Missing(_))));
    }
}
