//! Insurer response normalization
//!
//! Turns raw per-insurer quoting responses (success, failure or still
//! loading) into the uniform [`Insurer`] view model. Field selection per
//! insurer comes from [`crate::insurers::layout_for`].

use serde_json::Value;

use crate::insurers::{layout_for, CoverageLayout, DeductibleRule};
use crate::types::{
    CoverageObject, CoveragePlan, Insurer, InsurerStatus, PlanValues, QuoteResponse,
    QuotedCoverage, RawInsurerResult,
};

/// Sentinel for any missing figure
pub const MISSING: &str = "-";

/// Error text when the insurer gave no message
pub const DEFAULT_ERROR_MESSAGE: &str = "Datos no disponibles para esta aseguradora";

/// Error text for a 404 from the quoting service
pub const UNAVAILABLE_MESSAGE: &str = "Servicio no disponible temporalmente";

/// Normalize every raw result, preserving order
pub fn normalize_results(results: &[RawInsurerResult]) -> Vec<Insurer> {
    results.iter().map(normalize_result).collect()
}

/// Normalize a single raw result
pub fn normalize_result(raw: &RawInsurerResult) -> Insurer {
    let id = raw.insurer.to_lowercase();
    let logo = format!("/images/{}-logo.png", id);

    let status = if raw.loading {
        InsurerStatus::Loading
    } else {
        match &raw.data {
            Some(data) if data.is_failure() => error_status(data),
            data => InsurerStatus::Quoted(quoted_coverage(
                layout_for(&raw.insurer),
                first_result(data.as_ref()),
            )),
        }
    };

    Insurer {
        id,
        name: raw.insurer.clone(),
        logo,
        status,
        is_highlighted: false,
    }
}

fn error_status(data: &QuoteResponse) -> InsurerStatus {
    let message = if data.status == Some(404) {
        UNAVAILABLE_MESSAGE.to_string()
    } else {
        data.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
            .to_string()
    };

    InsurerStatus::Error {
        message,
        image_url: data.url_image.clone().filter(|u| !u.is_empty()),
    }
}

/// `resultado[0]` as an object, or empty
fn first_result(data: Option<&QuoteResponse>) -> CoverageObject {
    data.and_then(|d| d.resultado.first())
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn quoted_coverage(layout: &CoverageLayout, bundle: CoverageObject) -> QuotedCoverage {
    let coverages_raw = PlanValues::from_fn(|plan| select_coverage(layout, &bundle, plan));

    let prices = PlanValues::from_fn(|plan| {
        coverages_raw
            .get(plan)
            .get("dPrecioTotal")
            .and_then(truthy_text)
            .map(|p| format!("${}", p))
            .unwrap_or_else(|| MISSING.to_string())
    });

    let amplia = coverages_raw.get(CoveragePlan::Amplia);
    let deductible = match layout.deductible {
        DeductibleRule::Percent(field) => amplia
            .get(field)
            .and_then(value_text)
            .map(|d| format!("{}%", d)),
        DeductibleRule::Verbatim(field) => amplia.get(field).and_then(truthy_text),
    }
    .unwrap_or_else(|| MISSING.to_string());

    let medical_expenses = amplia
        .get(layout.medical_expenses)
        .and_then(truthy_text)
        .unwrap_or_else(|| MISSING.to_string());

    QuotedCoverage {
        prices,
        deductible,
        medical_expenses,
        coverages_raw,
    }
}

/// First key of the layout present as a non-empty object
fn select_coverage(layout: &CoverageLayout, bundle: &CoverageObject, plan: CoveragePlan) -> CoverageObject {
    layout
        .keys(plan)
        .iter()
        .filter_map(|key| bundle.get(*key).and_then(Value::as_object))
        .find(|obj| !obj.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Render a JSON scalar the way it reads in the insurer payloads.
/// Integral floats drop their ".0" ("8320.0" → "8320"). Null is absent.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(format_float)
            }
        }
        other => Some(other.to_string()),
    }
}

/// Like [`value_text`] but also treats `false`, `0` and `""` as absent
pub fn truthy_text(value: &Value) -> Option<String> {
    let falsy = match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if falsy {
        None
    } else {
        value_text(value)
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}
