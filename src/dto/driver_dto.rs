use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::{Driver, DriverStatus};
use crate::utils::validation::{validate_phone, LICENSE_NUMBER_RE};

/// Request para crear un conductor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(regex = "LICENSE_NUMBER_RE")]
    pub license_number: String,

    pub license_expiry_date: NaiveDate,

    #[serde(default)]
    #[validate(range(min = 0, max = 80))]
    pub experience: i32,

    pub status: Option<DriverStatus>,
}

/// Request para actualizar un conductor
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(regex = "LICENSE_NUMBER_RE")]
    pub license_number: Option<String>,

    pub license_expiry_date: Option<NaiveDate>,

    #[validate(range(min = 0, max = 80))]
    pub experience: Option<i32>,

    pub status: Option<DriverStatus>,
}

impl UpdateDriverRequest {
    /// Campos fuera del subconjunto que el rol `user` puede editar
    /// (phone, email)
    pub fn touches_restricted_fields(&self) -> bool {
        self.name.is_some()
            || self.license_number.is_some()
            || self.license_expiry_date.is_some()
            || self.experience.is_some()
            || self.status.is_some()
    }

    pub fn status_only(status: DriverStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, driver: &mut Driver) {
        if let Some(name) = &self.name {
            driver.name = name.clone();
        }
        if self.email.is_some() {
            driver.email = self.email.clone();
        }
        if self.phone.is_some() {
            driver.phone = self.phone.clone();
        }
        if let Some(license_number) = &self.license_number {
            driver.license_number = license_number.clone();
        }
        if let Some(expiry) = self.license_expiry_date {
            driver.license_expiry_date = expiry;
        }
        if let Some(experience) = self.experience {
            driver.experience = experience;
        }
        if let Some(status) = self.status {
            driver.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_driver_validation() {
        let ok: CreateDriverRequest = serde_json::from_value(json!({
            "name": "Kwame Mensah",
            "email": "kwame@fleet.local",
            "phone": "+233 24 555 0101",
            "licenseNumber": "DL-0042-2023",
            "licenseExpiryDate": "2026-05-01"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.experience, 0);

        let bad: CreateDriverRequest = serde_json::from_value(json!({
            "name": "",
            "email": "not-an-email",
            "licenseNumber": "x",
            "licenseExpiryDate": "2026-05-01"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("license_number"));
    }

    #[test]
    fn test_status_is_a_restricted_field() {
        let contact_only = UpdateDriverRequest {
            phone: Some("0244123456".into()),
            ..UpdateDriverRequest::default()
        };
        assert!(!contact_only.touches_restricted_fields());
        assert!(UpdateDriverRequest::status_only(DriverStatus::Suspended).touches_restricted_fields());
    }
}
