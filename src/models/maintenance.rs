//! Modelo de registros de mantenimiento

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registro de mantenimiento - tabla maintenance_records
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: i32,
    pub vehicle_id: i32,
    pub service_type: String,
    pub description: Option<String>,
    pub cost: Decimal,
    pub service_date: NaiveDate,
    pub next_service_date: Option<NaiveDate>,
    pub mileage_at_service: Option<i32>,
    pub performed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
