//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y su estado de ciclo de vida.
//! `assigned_driver_id` es una copia desnormalizada de la asignación activa
//! del historial: solo las operaciones del repositorio la modifican.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Available,
    Assigned,
    Maintenance,
    Retired,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Assigned => "assigned",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub registration_number: Option<String>,
    pub chassis_number: Option<String>,
    pub engine_number: Option<String>,
    pub fuel_type: String,
    pub horsepower: Option<i32>,
    pub seats: i32,
    pub mileage: i32,
    pub location: Option<String>,
    pub registration_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub roadworthiness_expiry: Option<NaiveDate>,
    pub annual_fee_expiry: Option<NaiveDate>,
    pub status: VehicleStatus,
    pub assigned_driver_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Nombre legible para logs e informes
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.year)
    }
}

/// Filtros para el listado de vehículos
///
/// Los vehículos dados de baja solo aparecen con `include_inactive`, que no
/// se expone en la query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    pub status: Option<VehicleStatus>,
    pub assigned_driver_id: Option<i32>,
    #[serde(skip)]
    pub include_inactive: bool,
}

impl VehicleFilter {
    pub fn available() -> Self {
        Self {
            status: Some(VehicleStatus::Available),
            ..Self::default()
        }
    }

    pub fn by_driver(driver_id: i32) -> Self {
        Self {
            assigned_driver_id: Some(driver_id),
            ..Self::default()
        }
    }

    /// Todos los vehículos, incluidos los dados de baja
    pub fn everything() -> Self {
        Self {
            include_inactive: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        (self.include_inactive || vehicle.is_active)
            && self.status.map_or(true, |status| vehicle.status == status)
            && self
                .assigned_driver_id
                .map_or(true, |driver_id| vehicle.assigned_driver_id == Some(driver_id))
    }
}
