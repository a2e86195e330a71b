//! Evaluación de vencimientos
//!
//! Una fecha vence pronto si faltan `threshold_days` días o menos, incluidas
//! las ya vencidas. La misma regla se aplica a los cuatro documentos del
//! vehículo y a la licencia del conductor.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Driver, DriverStatus, Vehicle};

/// Umbral por defecto en días
pub const DEFAULT_THRESHOLD_DAYS: i64 = 30;

pub fn is_expiring_soon(date: NaiveDate, today: NaiveDate, threshold_days: i64) -> bool {
    (date - today).num_days() <= threshold_days
}

/// Documento sujeto a vencimiento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceItem {
    Registration,
    Insurance,
    Roadworthiness,
    AnnualFee,
    DriverLicense,
}

/// Estado de una fecha concreta
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceEntry {
    pub item: ComplianceItem,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub expiring_soon: bool,
}

impl ComplianceEntry {
    fn evaluate(item: ComplianceItem, expiry_date: NaiveDate, today: NaiveDate, threshold: i64) -> Self {
        Self {
            item,
            expiry_date,
            days_remaining: (expiry_date - today).num_days(),
            expiring_soon: is_expiring_soon(expiry_date, today, threshold),
        }
    }
}

/// Fechas de un vehículo con su evaluación
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCompliance {
    pub vehicle_id: i32,
    pub entries: Vec<ComplianceEntry>,
}

/// Alerta del informe de flota
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAlert {
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub subject: String,
    #[serde(flatten)]
    pub entry: ComplianceEntry,
}

/// Informe de vencimientos de la flota
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub generated_for: NaiveDate,
    pub threshold_days: i64,
    pub alerts: Vec<ComplianceAlert>,
}

pub fn vehicle_compliance(vehicle: &Vehicle, today: NaiveDate, threshold: i64) -> VehicleCompliance {
    let dates = [
        (ComplianceItem::Registration, vehicle.registration_expiry),
        (ComplianceItem::Insurance, vehicle.insurance_expiry),
        (ComplianceItem::Roadworthiness, vehicle.roadworthiness_expiry),
        (ComplianceItem::AnnualFee, vehicle.annual_fee_expiry),
    ];

    VehicleCompliance {
        vehicle_id: vehicle.id,
        entries: dates
            .into_iter()
            .filter_map(|(item, date)| date.map(|date| ComplianceEntry::evaluate(item, date, today, threshold)))
            .collect(),
    }
}

/// Construir el informe con las fechas que vencen pronto
///
/// Solo se consideran vehículos activos y conductores no inactivos. Las
/// alertas se ordenan por fecha de vencimiento.
pub fn build_report(
    vehicles: &[Vehicle],
    drivers: &[Driver],
    today: NaiveDate,
    threshold: i64,
) -> ComplianceReport {
    let mut alerts: Vec<ComplianceAlert> = vehicles
        .iter()
        .filter(|vehicle| vehicle.is_active)
        .flat_map(|vehicle| {
            vehicle_compliance(vehicle, today, threshold)
                .entries
                .into_iter()
                .filter(|entry| entry.expiring_soon)
                .map(|entry| ComplianceAlert {
                    vehicle_id: Some(vehicle.id),
                    driver_id: None,
                    subject: vehicle.label(),
                    entry,
                })
        })
        .collect();

    alerts.extend(
        drivers
            .iter()
            .filter(|driver| driver.status != DriverStatus::Inactive)
            .map(|driver| {
                (
                    driver,
                    ComplianceEntry::evaluate(
                        ComplianceItem::DriverLicense,
                        driver.license_expiry_date,
                        today,
                        threshold,
                    ),
                )
            })
            .filter(|(_, entry)| entry.expiring_soon)
            .map(|(driver, entry)| ComplianceAlert {
                vehicle_id: None,
                driver_id: Some(driver.id),
                subject: driver.name.clone(),
                entry,
            }),
    );

    alerts.sort_by_key(|alert| alert.entry.expiry_date);

    ComplianceReport {
        generated_for: today,
        threshold_days: threshold,
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_expiring_soon() {
        let today = date(2024, 1, 1);
        assert!(is_expiring_soon(date(2024, 1, 20), today, DEFAULT_THRESHOLD_DAYS));
        assert!(!is_expiring_soon(date(2024, 3, 1), today, DEFAULT_THRESHOLD_DAYS));
        // Límite inclusivo y fechas ya vencidas
        assert!(is_expiring_soon(date(2024, 1, 31), today, DEFAULT_THRESHOLD_DAYS));
        assert!(!is_expiring_soon(date(2024, 2, 1), today, DEFAULT_THRESHOLD_DAYS));
        assert!(is_expiring_soon(date(2023, 6, 1), today, DEFAULT_THRESHOLD_DAYS));
    }

    #[test]
    fn test_report_collects_vehicle_and_driver_alerts() {
        let today = date(2024, 1, 1);
        let vehicle = Vehicle {
            id: 1,
            make: "Nissan".into(),
            model: "Navara".into(),
            year: 2019,
            registration_number: None,
            chassis_number: None,
            engine_number: None,
            fuel_type: "diesel".into(),
            horsepower: None,
            seats: 5,
            mileage: 0,
            location: None,
            registration_expiry: Some(date(2024, 6, 1)),
            insurance_expiry: Some(date(2024, 1, 20)),
            roadworthiness_expiry: None,
            annual_fee_expiry: Some(date(2023, 12, 1)),
            status: crate::models::VehicleStatus::Available,
            assigned_driver_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut inactive_driver = Driver {
            id: 9,
            name: "Kofi".into(),
            email: None,
            phone: None,
            license_number: "DL-0009".into(),
            license_expiry_date: date(2024, 1, 10),
            experience: 1,
            status: DriverStatus::Inactive,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut active_driver = inactive_driver.clone();
        active_driver.id = 10;
        active_driver.status = DriverStatus::Active;
        inactive_driver.license_expiry_date = date(2023, 1, 1);

        let report = build_report(&[vehicle], &[inactive_driver, active_driver], today, 30);

        let items: Vec<_> = report.alerts.iter().map(|alert| alert.entry.item).collect();
        assert_eq!(
            items,
            vec![
                ComplianceItem::AnnualFee,
                ComplianceItem::DriverLicense,
                ComplianceItem::Insurance,
            ]
        );
        assert_eq!(report.alerts[0].entry.days_remaining, -31);
        assert_eq!(report.alerts[1].driver_id, Some(10));
    }
}
