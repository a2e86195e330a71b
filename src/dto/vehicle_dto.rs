use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::{Vehicle, VehicleStatus};
use crate::utils::validation::{validate_fuel_type, REGISTRATION_NUMBER_RE};

fn default_seats() -> i32 {
    4
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,

    #[validate(regex = "REGISTRATION_NUMBER_RE")]
    pub registration_number: Option<String>,

    #[validate(length(max = 50))]
    pub chassis_number: Option<String>,

    #[validate(length(max = 50))]
    pub engine_number: Option<String>,

    #[validate(custom = "validate_fuel_type")]
    pub fuel_type: String,

    #[validate(range(min = 1, max = 5000))]
    pub horsepower: Option<i32>,

    #[serde(default = "default_seats")]
    #[validate(range(min = 1, max = 100))]
    pub seats: i32,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub mileage: i32,

    #[validate(length(max = 200))]
    pub location: Option<String>,

    pub registration_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub roadworthiness_expiry: Option<NaiveDate>,
    pub annual_fee_expiry: Option<NaiveDate>,

    /// Estado inicial: `available` si se omite. `assigned` no es válido aquí.
    pub status: Option<VehicleStatus>,

    /// Se acepta solo para rechazarlo con un error de validación
    pub assigned_driver_id: Option<i32>,
}

/// Request para actualizar un vehículo existente
///
/// La asignación solo cambia a través del historial de asignaciones:
/// `assigned_driver_id` se lee únicamente para rechazarlo.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    #[validate(regex = "REGISTRATION_NUMBER_RE")]
    pub registration_number: Option<String>,

    #[validate(length(max = 50))]
    pub chassis_number: Option<String>,

    #[validate(length(max = 50))]
    pub engine_number: Option<String>,

    #[validate(custom = "validate_fuel_type")]
    pub fuel_type: Option<String>,

    #[validate(range(min = 1, max = 5000))]
    pub horsepower: Option<i32>,

    #[validate(range(min = 1, max = 100))]
    pub seats: Option<i32>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    #[validate(length(max = 200))]
    pub location: Option<String>,

    pub registration_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub roadworthiness_expiry: Option<NaiveDate>,
    pub annual_fee_expiry: Option<NaiveDate>,

    pub status: Option<VehicleStatus>,

    /// Se acepta solo para rechazarlo con un error de validación
    pub assigned_driver_id: Option<i32>,
}

impl UpdateVehicleRequest {
    /// Campos fuera del subconjunto que el rol `user` puede editar
    /// (status, mileage, location)
    pub fn touches_restricted_fields(&self) -> bool {
        self.make.is_some()
            || self.model.is_some()
            || self.year.is_some()
            || self.registration_number.is_some()
            || self.chassis_number.is_some()
            || self.engine_number.is_some()
            || self.fuel_type.is_some()
            || self.horsepower.is_some()
            || self.seats.is_some()
            || self.registration_expiry.is_some()
            || self.insurance_expiry.is_some()
            || self.roadworthiness_expiry.is_some()
            || self.annual_fee_expiry.is_some()
    }

    /// Solo cambio de estado
    pub fn status_only(status: VehicleStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Aplicar los campos presentes sobre el vehículo
    ///
    /// Un estado distinto de `assigned` libera al conductor; el repositorio
    /// cierra el registro activo en la misma transacción.
    pub fn apply_to(&self, vehicle: &mut Vehicle) {
        if let Some(make) = &self.make {
            vehicle.make = make.clone();
        }
        if let Some(model) = &self.model {
            vehicle.model = model.clone();
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        if self.registration_number.is_some() {
            vehicle.registration_number = self.registration_number.clone();
        }
        if self.chassis_number.is_some() {
            vehicle.chassis_number = self.chassis_number.clone();
        }
        if self.engine_number.is_some() {
            vehicle.engine_number = self.engine_number.clone();
        }
        if let Some(fuel_type) = &self.fuel_type {
            vehicle.fuel_type = fuel_type.clone();
        }
        if self.horsepower.is_some() {
            vehicle.horsepower = self.horsepower;
        }
        if let Some(seats) = self.seats {
            vehicle.seats = seats;
        }
        if let Some(mileage) = self.mileage {
            vehicle.mileage = mileage;
        }
        if self.location.is_some() {
            vehicle.location = self.location.clone();
        }
        if self.registration_expiry.is_some() {
            vehicle.registration_expiry = self.registration_expiry;
        }
        if self.insurance_expiry.is_some() {
            vehicle.insurance_expiry = self.insurance_expiry;
        }
        if self.roadworthiness_expiry.is_some() {
            vehicle.roadworthiness_expiry = self.roadworthiness_expiry;
        }
        if self.annual_fee_expiry.is_some() {
            vehicle.annual_fee_expiry = self.annual_fee_expiry;
        }
        if let Some(status) = self.status {
            vehicle.status = status;
            if status != VehicleStatus::Assigned {
                vehicle.assigned_driver_id = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_defaults_and_validation() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "make": "Toyota",
            "model": "Hilux",
            "year": 2021,
            "fuelType": "diesel",
            "registrationNumber": "GR-1234-21"
        }))
        .unwrap();
        assert_eq!(request.seats, 4);
        assert_eq!(request.mileage, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_unknown_fuel_and_bad_year() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "make": "Toyota",
            "model": "Hilux",
            "year": 1850,
            "fuelType": "steam"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("year"));
        assert!(fields.contains_key("fuel_type"));
    }

    #[test]
    fn test_limited_field_detection() {
        let limited: UpdateVehicleRequest = serde_json::from_value(json!({
            "status": "maintenance",
            "mileage": 120000,
            "location": "Depot B"
        }))
        .unwrap();
        assert!(!limited.touches_restricted_fields());

        let full: UpdateVehicleRequest = serde_json::from_value(json!({
            "status": "maintenance",
            "insuranceExpiry": "2025-01-01"
        }))
        .unwrap();
        assert!(full.touches_restricted_fields());
    }

    #[test]
    fn test_apply_status_change_releases_driver() {
        let mut vehicle: Vehicle = serde_json::from_value(json!({
            "id": 1,
            "make": "Toyota",
            "model": "Hilux",
            "year": 2021,
            "registrationNumber": "GR-1234-21",
            "chassisNumber": null,
            "engineNumber": null,
            "fuelType": "diesel",
            "horsepower": null,
            "seats": 4,
            "mileage": 1000,
            "location": null,
            "registrationExpiry": null,
            "insuranceExpiry": null,
            "roadworthinessExpiry": null,
            "annualFeeExpiry": null,
            "status": "assigned",
            "assignedDriverId": 5,
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let request = UpdateVehicleRequest {
            mileage: Some(1500),
            location: Some("Depot B".into()),
            ..UpdateVehicleRequest::default()
        };
        request.apply_to(&mut vehicle);
        assert_eq!(vehicle.mileage, 1500);
        assert_eq!(vehicle.assigned_driver_id, Some(5));

        UpdateVehicleRequest::status_only(VehicleStatus::Maintenance).apply_to(&mut vehicle);
        assert_eq!(vehicle.status, VehicleStatus::Maintenance);
        assert_eq!(vehicle.assigned_driver_id, None);
    }

    #[test]
    fn test_assigned_driver_is_captured_for_rejection() {
        let request: UpdateVehicleRequest = serde_json::from_value(json!({
            "assignedDriverId": 9
        }))
        .unwrap();
        assert_eq!(request.assigned_driver_id, Some(9));
        assert!(request.status.is_none());
    }
}
