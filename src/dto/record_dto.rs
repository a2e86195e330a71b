use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::{FuelRecord, MaintenanceRecord};
use crate::utils::validation::{validate_non_negative, validate_not_blank, validate_positive};

/// Request para registrar un mantenimiento
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i32,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub service_type: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(custom = "validate_non_negative")]
    pub cost: Decimal,

    pub service_date: NaiveDate,

    pub next_service_date: Option<NaiveDate>,

    #[validate(range(min = 0))]
    pub mileage_at_service: Option<i32>,

    #[validate(length(max = 100))]
    pub performed_by: Option<String>,
}

/// Request para corregir un registro de mantenimiento
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub service_type: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(custom = "validate_non_negative")]
    pub cost: Option<Decimal>,

    pub service_date: Option<NaiveDate>,

    pub next_service_date: Option<NaiveDate>,

    #[validate(range(min = 0))]
    pub mileage_at_service: Option<i32>,

    #[validate(length(max = 100))]
    pub performed_by: Option<String>,
}

impl UpdateMaintenanceRequest {
    pub fn apply_to(&self, record: &mut MaintenanceRecord) {
        if let Some(service_type) = &self.service_type {
            record.service_type = service_type.clone();
        }
        if self.description.is_some() {
            record.description = self.description.clone();
        }
        if let Some(cost) = self.cost {
            record.cost = cost;
        }
        if let Some(service_date) = self.service_date {
            record.service_date = service_date;
        }
        if self.next_service_date.is_some() {
            record.next_service_date = self.next_service_date;
        }
        if self.mileage_at_service.is_some() {
            record.mileage_at_service = self.mileage_at_service;
        }
        if self.performed_by.is_some() {
            record.performed_by = self.performed_by.clone();
        }
    }
}

/// Request para registrar un repostaje
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFuelRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i32,

    #[validate(range(min = 1))]
    pub driver_id: Option<i32>,

    pub fuel_date: NaiveDate,

    #[validate(custom = "validate_positive")]
    pub liters: Decimal,

    #[validate(custom = "validate_non_negative")]
    pub cost: Decimal,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    #[validate(length(max = 200))]
    pub station: Option<String>,
}

/// Request para corregir un repostaje
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFuelRequest {
    pub fuel_date: Option<NaiveDate>,

    #[validate(custom = "validate_positive")]
    pub liters: Option<Decimal>,

    #[validate(custom = "validate_non_negative")]
    pub cost: Option<Decimal>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    #[validate(length(max = 200))]
    pub station: Option<String>,
}

impl UpdateFuelRequest {
    pub fn apply_to(&self, record: &mut FuelRecord) {
        if let Some(fuel_date) = self.fuel_date {
            record.fuel_date = fuel_date;
        }
        if let Some(liters) = self.liters {
            record.liters = liters;
        }
        if let Some(cost) = self.cost {
            record.cost = cost;
        }
        if self.mileage.is_some() {
            record.mileage = self.mileage;
        }
        if self.station.is_some() {
            record.station = self.station.clone();
        }
    }
}
