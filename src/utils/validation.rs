//! Utilidades de validación
//!
//! Expresiones regulares y validadores personalizados usados por los DTOs
//! con `#[derive(Validate)]`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Matrícula: letras, dígitos, espacios y guiones
    pub static ref REGISTRATION_NUMBER_RE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,19}$").unwrap();

    /// Número de licencia de conducir
    pub static ref LICENSE_NUMBER_RE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-/]{3,29}$").unwrap();

    /// Nombre de usuario
    pub static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]{3,50}$").unwrap();
}

/// Tipos de combustible aceptados
pub const FUEL_TYPES: &[&str] = &["gasoline", "diesel", "hybrid", "electric", "lpg", "cng"];

/// Validar el tipo de combustible contra la lista permitida
pub fn validate_fuel_type(value: &str) -> Result<(), ValidationError> {
    if FUEL_TYPES.contains(&value) {
        return Ok(());
    }
    let mut error = ValidationError::new("fuel_type");
    error.add_param("value".into(), &value.to_string());
    error.add_param("allowed_values".into(), &FUEL_TYPES);
    Err(error)
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if !allowed || !(7..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe no sea negativo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una cantidad sea estrictamente positiva
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un texto no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_registration_number_format() {
        assert!(REGISTRATION_NUMBER_RE.is_match("GR-1234-21"));
        assert!(REGISTRATION_NUMBER_RE.is_match("AB 123 CD"));
        assert!(!REGISTRATION_NUMBER_RE.is_match("-AB"));
        assert!(!REGISTRATION_NUMBER_RE.is_match("AB#123"));
    }

    #[test]
    fn test_license_number_format() {
        assert!(LICENSE_NUMBER_RE.is_match("DL-0042-2023"));
        assert!(!LICENSE_NUMBER_RE.is_match("AB"));
    }

    #[test]
    fn test_fuel_type() {
        assert!(validate_fuel_type("diesel").is_ok());
        assert!(validate_fuel_type("steam").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+233 24 123 4567").is_ok());
        assert!(validate_phone("12").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_amounts() {
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::from_str("-1.5").unwrap()).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::from_str("40.25").unwrap()).is_ok());
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank("oil change").is_ok());
    }
}
