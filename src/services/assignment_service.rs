//! Reglas del ciclo de vida de asignaciones
//!
//! Funciones puras que deciden si una transición es válida y con qué motivo
//! se cierra el registro activo. Los repositorios (PostgreSQL y memoria) las
//! ejecutan dentro de su transacción, así ambos aplican exactamente las mismas
//! reglas.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{AssignmentRecord, Driver, DriverStatus, Vehicle, VehicleStatus};
use crate::utils::errors::{invalid_state_error, not_found_error, AppResult};

/// Motivo con el que se cierra el registro anterior al reasignar
pub const REASSIGNED_REASON: &str = "reassigned";

/// Motivo por defecto de una desasignación explícita
pub const DEFAULT_UNASSIGN_REASON: &str = "Unassigned";

/// Motivo al dar de baja un vehículo
pub const VEHICLE_REMOVED_REASON: &str = "vehicle removed";

/// Precondiciones de Assign
///
/// `driver_assignment` es el registro activo del conductor, si tiene uno.
pub fn check_assignable(
    vehicle: &Vehicle,
    driver: &Driver,
    driver_assignment: Option<&AssignmentRecord>,
) -> AppResult<()> {
    if !vehicle.is_active {
        return Err(not_found_error("Vehicle", vehicle.id));
    }
    if vehicle.status == VehicleStatus::Retired {
        return Err(invalid_state_error(format!(
            "Vehicle {} is retired and cannot be assigned",
            vehicle.id
        )));
    }
    if driver.status != DriverStatus::Active {
        return Err(invalid_state_error(format!(
            "Driver {} is {} and cannot be assigned",
            driver.id, driver.status
        )));
    }
    if let Some(record) = driver_assignment {
        if record.vehicle_id != vehicle.id {
            return Err(invalid_state_error(format!(
                "Driver {} is already assigned to vehicle {}",
                driver.id, record.vehicle_id
            )));
        }
    }
    Ok(())
}

/// Validar un cambio de estado pedido por una actualización de vehículo
///
/// `assigned` solo se alcanza mediante Assign.
pub fn check_status_change(status: Option<VehicleStatus>) -> AppResult<()> {
    if status == Some(VehicleStatus::Assigned) {
        return Err(crate::utils::errors::validation_error(
            "status",
            "status 'assigned' can only be set by creating an assignment",
        ));
    }
    Ok(())
}

/// Motivo de cierre cuando un vehículo asignado cambia de estado
///
/// `None` si el cambio no afecta al historial.
pub fn release_reason_for_vehicle(before: &Vehicle, new_status: VehicleStatus) -> Option<String> {
    if before.assigned_driver_id.is_none() || new_status == VehicleStatus::Assigned {
        return None;
    }
    Some(format!("vehicle status changed to {}", new_status))
}

/// Motivo de cierre cuando un conductor deja de estar activo
pub fn release_reason_for_driver(before: &Driver, new_status: DriverStatus) -> Option<String> {
    if before.status == new_status || new_status == DriverStatus::Active {
        return None;
    }
    Some(format!("driver {}", new_status))
}

/// Inconsistencia detectada por la auditoría del historial
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerViolation {
    /// `assigned_driver_id`/`status` del vehículo no coinciden con el registro activo
    #[serde(rename_all = "camelCase")]
    VehicleOutOfSync {
        vehicle_id: i32,
        assigned_driver_id: Option<i32>,
        status: VehicleStatus,
        active_driver_id: Option<i32>,
    },
    #[serde(rename_all = "camelCase")]
    MultipleActiveForVehicle { vehicle_id: i32, record_ids: Vec<i32> },
    #[serde(rename_all = "camelCase")]
    MultipleActiveForDriver { driver_id: i32, record_ids: Vec<i32> },
}

/// Recalcular los invariantes del historial a partir del almacenamiento
pub fn audit_ledger(vehicles: &[Vehicle], records: &[AssignmentRecord]) -> Vec<LedgerViolation> {
    let mut by_vehicle: HashMap<i32, Vec<&AssignmentRecord>> = HashMap::new();
    let mut by_driver: HashMap<i32, Vec<i32>> = HashMap::new();
    for record in records.iter().filter(|record| record.is_active) {
        by_vehicle.entry(record.vehicle_id).or_default().push(record);
        by_driver.entry(record.driver_id).or_default().push(record.id);
    }

    let mut violations = Vec::new();

    for vehicle in vehicles {
        let active = by_vehicle.get(&vehicle.id).map(Vec::as_slice).unwrap_or(&[]);
        if active.len() > 1 {
            violations.push(LedgerViolation::MultipleActiveForVehicle {
                vehicle_id: vehicle.id,
                record_ids: active.iter().map(|record| record.id).collect(),
            });
        }

        let active_driver_id = active.first().map(|record| record.driver_id);
        let status_consistent =
            vehicle.assigned_driver_id.is_some() == (vehicle.status == VehicleStatus::Assigned);
        if !status_consistent || vehicle.assigned_driver_id != active_driver_id {
            violations.push(LedgerViolation::VehicleOutOfSync {
                vehicle_id: vehicle.id,
                assigned_driver_id: vehicle.assigned_driver_id,
                status: vehicle.status,
                active_driver_id,
            });
        }
    }

    let mut drivers: Vec<_> = by_driver.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
    drivers.sort_by_key(|(driver_id, _)| *driver_id);
    violations.extend(drivers.into_iter().map(|(driver_id, record_ids)| {
        LedgerViolation::MultipleActiveForDriver {
            driver_id,
            record_ids,
        }
    }));

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn vehicle(id: i32, status: VehicleStatus, driver: Option<i32>) -> Vehicle {
        Vehicle {
            id,
            make: "Toyota".into(),
            model: "Hilux".into(),
            year: 2021,
            registration_number: None,
            chassis_number: None,
            engine_number: None,
            fuel_type: "diesel".into(),
            horsepower: None,
            seats: 4,
            mileage: 0,
            location: None,
            registration_expiry: None,
            insurance_expiry: None,
            roadworthiness_expiry: None,
            annual_fee_expiry: None,
            status,
            assigned_driver_id: driver,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn driver(id: i32, status: DriverStatus) -> Driver {
        Driver {
            id,
            name: "Ama".into(),
            email: None,
            phone: None,
            license_number: format!("DL-{id:04}"),
            license_expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            experience: 3,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(id: i32, vehicle_id: i32, driver_id: i32, is_active: bool) -> AssignmentRecord {
        AssignmentRecord {
            id,
            vehicle_id,
            driver_id,
            assigned_date: Utc::now(),
            unassigned_date: None,
            reason: None,
            assigned_by: 1,
            is_active,
        }
    }

    #[test]
    fn test_assign_preconditions() {
        let available = vehicle(1, VehicleStatus::Available, None);
        assert!(check_assignable(&available, &driver(5, DriverStatus::Active), None).is_ok());

        let err = check_assignable(&available, &driver(5, DriverStatus::Suspended), None)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");

        let retired = vehicle(2, VehicleStatus::Retired, None);
        let err = check_assignable(&retired, &driver(5, DriverStatus::Active), None).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");

        let mut removed = vehicle(3, VehicleStatus::Retired, None);
        removed.is_active = false;
        let err = check_assignable(&removed, &driver(5, DriverStatus::Active), None).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_driver_busy_on_another_vehicle() {
        let target = vehicle(1, VehicleStatus::Available, None);
        let elsewhere = record(10, 2, 5, true);
        let err = check_assignable(&target, &driver(5, DriverStatus::Active), Some(&elsewhere))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");

        // Reasignar el mismo par no es un error
        let same = record(11, 1, 5, true);
        assert!(check_assignable(&target, &driver(5, DriverStatus::Active), Some(&same)).is_ok());
    }

    #[test]
    fn test_status_assigned_is_rejected() {
        assert!(check_status_change(Some(VehicleStatus::Assigned)).is_err());
        assert!(check_status_change(Some(VehicleStatus::Maintenance)).is_ok());
        assert!(check_status_change(None).is_ok());
    }

    #[test]
    fn test_release_reasons() {
        let assigned = vehicle(1, VehicleStatus::Assigned, Some(5));
        assert_eq!(
            release_reason_for_vehicle(&assigned, VehicleStatus::Maintenance).as_deref(),
            Some("vehicle status changed to maintenance")
        );
        let available = vehicle(2, VehicleStatus::Available, None);
        assert_eq!(release_reason_for_vehicle(&available, VehicleStatus::Retired), None);

        let active = driver(5, DriverStatus::Active);
        assert_eq!(
            release_reason_for_driver(&active, DriverStatus::Suspended).as_deref(),
            Some("driver suspended")
        );
        assert_eq!(release_reason_for_driver(&active, DriverStatus::Active), None);
    }

    #[test]
    fn test_audit_clean_ledger() {
        let vehicles = vec![
            vehicle(1, VehicleStatus::Assigned, Some(5)),
            vehicle(2, VehicleStatus::Available, None),
        ];
        let records = vec![record(1, 1, 7, false), record(2, 1, 5, true)];
        assert!(audit_ledger(&vehicles, &records).is_empty());
    }

    #[test]
    fn test_audit_detects_violations() {
        let vehicles = vec![
            vehicle(1, VehicleStatus::Assigned, Some(5)),
            vehicle(2, VehicleStatus::Available, Some(6)),
        ];
        let records = vec![
            record(1, 1, 5, true),
            record(2, 1, 6, true),
            record(3, 3, 6, true),
        ];
        let violations = audit_ledger(&vehicles, &records);

        assert!(violations.contains(&LedgerViolation::MultipleActiveForVehicle {
            vehicle_id: 1,
            record_ids: vec![1, 2],
        }));
        assert!(violations.contains(&LedgerViolation::VehicleOutOfSync {
            vehicle_id: 2,
            assigned_driver_id: Some(6),
            status: VehicleStatus::Available,
            active_driver_id: None,
        }));
        assert!(violations.contains(&LedgerViolation::MultipleActiveForDriver {
            driver_id: 6,
            record_ids: vec![2, 3],
        }));
    }
}
