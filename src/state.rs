//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::config::environment::EnvironmentConfig;
use crate::repositories::FleetRepository;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FleetRepository>,
    pub sessions: SessionService,
    pub config: Arc<EnvironmentConfig>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FleetRepository>, config: EnvironmentConfig) -> Self {
        let sessions = SessionService::new(&config.session_secret, config.session_ttl_secs);
        Self {
            repository,
            sessions,
            config: Arc::new(config),
        }
    }

    /// Fecha de referencia para los vencimientos
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
