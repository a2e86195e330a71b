//! Modelo de Driver

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado del conductor - mapea al ENUM driver_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "driver_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
    Suspended,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
            DriverStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: String,
    pub license_expiry_date: NaiveDate,
    pub experience: i32,
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filtros para el listado de conductores
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverFilter {
    pub status: Option<DriverStatus>,
    /// Excluir conductores con una asignación activa
    #[serde(skip)]
    pub unassigned_only: bool,
}

impl DriverFilter {
    pub fn active() -> Self {
        Self {
            status: Some(DriverStatus::Active),
            unassigned_only: false,
        }
    }

    /// Conductores que `assign` aceptaría: activos y sin vehículo
    pub fn available() -> Self {
        Self {
            unassigned_only: true,
            ..Self::active()
        }
    }

    pub fn matches(&self, driver: &Driver) -> bool {
        self.status.map_or(true, |status| driver.status == status)
    }
}
