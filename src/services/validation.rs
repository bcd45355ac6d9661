//! Quote input validation
//!
//! Errors are collected rather than returned on the first failure so the
//! user sees every problem at once. Messages are user-facing (Spanish).

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::insurers::InsurerId;
use crate::types::{CotizadorError, Gender, QuoteRequestBody, Result, UserData, VehicleData};

static FOUR_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

pub const POSTAL_CODE_NOT_NUMERIC: &str = "El código postal solo debe contener números";
pub const POSTAL_CODE_WRONG_LENGTH: &str = "El código postal debe tener 5 dígitos";

/// Exactly five ASCII digits
pub fn validate_postal_code(value: &str) -> std::result::Result<(), String> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(POSTAL_CODE_NOT_NUMERIC.to_string());
    }
    if value.len() != 5 {
        return Err(POSTAL_CODE_WRONG_LENGTH.to_string());
    }
    Ok(())
}

/// Model year used by catalog lookups
pub fn validate_year(value: &str) -> std::result::Result<(), String> {
    if FOUR_DIGITS.is_match(value.trim()) {
        Ok(())
    } else {
        Err(format!("El año debe tener 4 dígitos: '{}'", value))
    }
}

/// "YYYY-MM-DD" → "DD-MM-YYYY"
pub fn birthdate_for_backend(value: &str) -> std::result::Result<String, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|date| date.format("%d-%m-%Y").to_string())
        .map_err(|_| format!("Fecha de nacimiento inválida (AAAA-MM-DD): '{}'", value))
}

/// Every problem with the form, empty when it can be submitted
pub fn validate_quote_input(
    vehicle: &VehicleData,
    user: &UserData,
    insurers: &[InsurerId],
) -> Vec<String> {
    let mut errors = Vec::new();

    let required = [
        ("marca", &vehicle.marca),
        ("año", &vehicle.anio),
        ("modelo", &vehicle.modelo),
        ("descripción", &vehicle.descripcion),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(format!("El campo {} es obligatorio", field));
        }
    }
    if !vehicle.anio.trim().is_empty() {
        if let Err(e) = validate_year(&vehicle.anio) {
            errors.push(e);
        }
    }

    if Gender::parse(&user.genero).is_none() {
        errors.push(format!("Sexo no reconocido: '{}'", user.genero));
    }
    if let Err(e) = birthdate_for_backend(&user.fecha_nacimiento) {
        errors.push(e);
    }
    if let Err(e) = validate_postal_code(&user.codigo_postal) {
        errors.push(e);
    }

    if insurers.is_empty() {
        errors.push("Selecciona al menos una aseguradora".to_string());
    }

    errors
}

/// Validate and map the form onto the backend request body
pub fn build_request(
    vehicle: &VehicleData,
    user: &UserData,
    insurers: &[InsurerId],
) -> Result<QuoteRequestBody> {
    let errors = validate_quote_input(vehicle, user, insurers);
    if !errors.is_empty() {
        return Err(CotizadorError::Validation(errors));
    }

    let gender = Gender::parse(&user.genero)
        .ok_or_else(|| CotizadorError::Validation(vec![user.genero.clone()]))?;
    let birthdate = birthdate_for_backend(&user.fecha_nacimiento)
        .map_err(|e| CotizadorError::Validation(vec![e]))?;

    Ok(QuoteRequestBody::new(
        vehicle,
        gender,
        birthdate,
        &user.codigo_postal,
    ))
}
