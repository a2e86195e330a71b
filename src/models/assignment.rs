//! Modelo de asignaciones vehículo ↔ conductor
//!
//! Cada fila del historial es un periodo de asignación. Para un mismo
//! vehículo existe como mucho una fila con `is_active = true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registro del historial de asignaciones - tabla vehicle_assignments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub assigned_date: DateTime<Utc>,
    pub unassigned_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub assigned_by: i32,
    pub is_active: bool,
}

impl AssignmentRecord {
    /// Cerrar el periodo de asignación
    pub fn close(&mut self, at: DateTime<Utc>, reason: &str) {
        self.is_active = false;
        self.unassigned_date = Some(at);
        self.reason = Some(reason.to_string());
    }
}

/// Orden de asignación ya autorizada
#[derive(Debug, Clone)]
pub struct AssignCommand {
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub assigned_by: i32,
    pub reason: Option<String>,
}

/// Filtros del historial de asignaciones
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFilter {
    #[serde(default)]
    pub active: Option<bool>,
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
}

impl AssignmentFilter {
    pub fn for_vehicle(vehicle_id: i32) -> Self {
        Self {
            vehicle_id: Some(vehicle_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &AssignmentRecord) -> bool {
        self.active.map_or(true, |active| record.is_active == active)
            && self.vehicle_id.map_or(true, |id| record.vehicle_id == id)
            && self.driver_id.map_or(true, |id| record.driver_id == id)
    }
}
