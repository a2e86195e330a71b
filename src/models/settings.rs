//! Configuración del sistema editable por el super admin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Entrada clave/valor - tabla system_settings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_by: Option<i32>,
    pub updated_at: DateTime<Utc>,
}
