//! Quote input types: vehicle, applicant and the backend request body

use serde::{Deserialize, Serialize};

/// Placeholder for empty fields in summaries and spreadsheets
const EMPTY: &str = "-";

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY
    } else {
        value
    }
}

/// Insured vehicle as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    pub marca: String,
    #[serde(rename = "año")]
    pub anio: String,
    pub modelo: String,
    pub descripcion: String,
}

impl VehicleData {
    /// "Honda - 2017 - CRV - Elegance 2WD"
    pub fn summary(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            or_dash(&self.marca),
            or_dash(&self.anio),
            or_dash(&self.modelo),
            or_dash(&self.descripcion)
        )
    }
}

/// Applicant demographics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub genero: String,
    /// YYYY-MM-DD
    #[serde(rename = "fechaNacimiento")]
    pub fecha_nacimiento: String,
    #[serde(rename = "codigoPostal")]
    pub codigo_postal: String,
}

impl UserData {
    /// "Femenino - 2001-02-01 - 07310"
    pub fn summary(&self) -> String {
        format!(
            "{} - {} - {}",
            or_dash(&self.genero),
            or_dash(&self.fecha_nacimiento),
            or_dash(&self.codigo_postal)
        )
    }
}

/// Applicant gender as understood by the quoting backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Masculino,
    Femenino,
}

impl Gender {
    /// Accepts the labels used by the forms ("Hombre", "Mujer", "M", "F", ...)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hombre" | "masculino" | "m" => Some(Self::Masculino),
            "mujer" | "femenino" | "f" => Some(Self::Femenino),
            _ => None,
        }
    }

    pub fn as_backend(self) -> &'static str {
        match self {
            Self::Masculino => "MASCULINO",
            Self::Femenino => "FEMENINO",
        }
    }
}

/// JSON body posted to every insurer endpoint (also used by the batch API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    pub v_brand: String,
    pub v_sub_brand: String,
    pub v_model: String,
    pub v_description: String,
    pub v_sexo_persona: String,
    /// DD-MM-YYYY
    pub v_fecha_nacimiento_persona: String,
    pub v_codigo_postal_persona: String,
}

impl QuoteRequestBody {
    /// Map form data onto backend field names. `vModel` carries the year
    /// and `vSubBrand` the model, as the quoting API expects.
    pub fn new(vehicle: &VehicleData, gender: Gender, birthdate: String, postal_code: &str) -> Self {
        Self {
            v_brand: vehicle.marca.clone(),
            v_sub_brand: vehicle.modelo.clone(),
            v_model: vehicle.anio.clone(),
            v_description: vehicle.descripcion.clone(),
            v_sexo_persona: gender.as_backend().to_string(),
            v_fecha_nacimiento_persona: birthdate,
            v_codigo_postal_persona: postal_code.to_string(),
        }
    }
}
