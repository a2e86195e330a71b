//! Modelo de registros de combustible

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registro de repostaje - tabla fuel_records
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FuelRecord {
    pub id: i32,
    pub vehicle_id: i32,
    pub driver_id: Option<i32>,
    pub fuel_date: NaiveDate,
    pub liters: Decimal,
    pub cost: Decimal,
    pub mileage: Option<i32>,
    pub station: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filtro por vehículo para los listados de mantenimiento y combustible
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    pub vehicle_id: Option<i32>,
}
